// Application layer - Use case interactors

pub mod container;
pub mod plan_interactor;
pub mod strip_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use plan_interactor::{PlanFormat, PlanInteractor, PlanRequest, PlanResponse};
pub use strip_interactor::{FileOutcome, FileReport, StripInteractor, StripRequest, StripResponse};
