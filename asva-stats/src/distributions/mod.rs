//! Distribution functions: normal, t, F, chi-squared, studentized range

pub mod normal;
pub mod t;
pub mod f;
pub mod chi;
pub mod tukey;

pub use normal::{erfc, normal_cdf, normal_quantile, normal_sf};
pub use t::{gamma_ln, regularized_incomplete_beta, t_two_sided_p};
pub use f::f_sf;
pub use chi::chi_squared_sf;
pub use tukey::{ptukey, studentized_range_sf};
