//! Plain-text summary of a study report.

use cycles_core::charts::Figure;
use cycles_core::studies::StudyReport;
use std::fmt::{self, Write};

pub fn render(report: &StudyReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

fn write_report(out: &mut impl Write, report: &StudyReport) -> fmt::Result {
    writeln!(out, "study: {}", report.study)?;
    for figure in &report.figures {
        writeln!(out, "{}", figure_line(figure))?;
    }

    if !report.equilibria.is_empty() {
        writeln!(out, "\nequilibria")?;
        writeln!(out, "{:>12} {:>12}  stability", "Y*", "dF/dY")?;
        for eq in &report.equilibria {
            writeln!(
                out,
                "{:>12.5} {:>12.5}  {:?}",
                eq.location, eq.slope, eq.stability
            )?;
        }
    }

    if let Some(eq) = &report.planar_equilibrium {
        writeln!(
            out,
            "\nequilibrium (Y, K) = ({:.5}, {:.5}): {:?}",
            eq.state.x, eq.state.y, eq.kind
        )?;
        for ev in &eq.eigenvalues {
            writeln!(out, "  eigenvalue {:.5} {:+.5}i", ev.re, ev.im)?;
        }
    }

    match report.cycle_period {
        Some(period) => {
            writeln!(out, "\ncycle period: {period:.3}")?;
        }
        None if report.planar_equilibrium.is_some() => {
            writeln!(out, "\ncycle period: none (trajectory settles)")?;
        }
        None => {}
    }

    if !report.frontier.is_empty() {
        writeln!(out, "\nfrontier (top {})", report.frontier.len())?;
        writeln!(
            out,
            "{:>7} {:>7} {:>10} {:>8} {:>9}",
            "alpha", "beta", "overshoot", "radius", "period"
        )?;
        for r in &report.frontier {
            let period = r
                .approx_period
                .map_or_else(|| "inf".to_owned(), |p| format!("{p:.2}"));
            writeln!(
                out,
                "{:>7.3} {:>7.3} {:>10.4} {:>8.4} {:>9}",
                r.alpha, r.beta, r.overshoot, r.spectral_radius, period
            )?;
        }
    }

    for r in &report.operating_points {
        writeln!(
            out,
            "operating point: alpha = {}, beta = {}, radius {:.3}, peak {:.2}",
            r.alpha, r.beta, r.spectral_radius, r.overshoot
        )?;
    }
    Ok(())
}

fn figure_line(figure: &Figure) -> String {
    format!(
        "figure {} \"{}\" ({} layers)",
        figure.id,
        figure.title,
        figure.layers.len()
    )
}

#[cfg(test)]
mod tests {
    use super::render;
    use cycles_core::studies::{run_study, Study, StudyConfig};

    #[test]
    fn curve_table_lists_each_equilibrium() {
        let report = run_study(Study::KaldorCurves, &StudyConfig::default()).expect("study");
        let text = render(&report).expect("render");
        assert!(text.starts_with("study: kaldor-curves"));
        assert_eq!(text.matches("Unstable").count(), 2, "{text}");
        assert_eq!(text.matches("Stable").count(), 1, "{text}");
    }
}
