pub mod fatigue;
pub mod momentum;

pub use fatigue::{FatigueAssessment, FatigueStatus};
pub use momentum::{MomentumAssessment, MomentumType};
