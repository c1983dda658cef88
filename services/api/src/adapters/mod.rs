pub mod static_plan;

pub use static_plan::StaticPlanGenerator;
