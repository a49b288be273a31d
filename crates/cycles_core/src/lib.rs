pub mod charts;
pub mod contour;
pub mod equilibrium;
pub mod error;
pub mod grid;
pub mod models;
pub mod solvers;
pub mod spectrum;
pub mod studies;
/// The `cycles_core` crate holds the numerical engine behind the business-cycle studies.
/// Every model is a small dynamical system driven by explicit parameter values;
/// nothing is read from ambient state.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem` (ODEs/Maps), `Steppable` (Solvers), `PlanarField`.
/// - **Solvers**: RK4 and the discrete-map iterator, plus the `simulate` driver.
/// - **Trajectory**: fixed-step RK4 integration of planar fields.
/// - **Equilibrium**: sign-change root classification and planar Newton equilibria.
/// - **Models**: Kaldor (1-D and 2-D), Samuelson, Goodwin, linear fields, policy modes.
/// - **Charts / Studies**: serialisable figure payloads for each study.
pub mod traits;
pub mod trajectory;
