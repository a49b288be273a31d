pub mod goodwin;
pub mod kaldor;
pub mod kaldor_curves;
pub mod linear;
pub mod policy;
pub mod samuelson;
