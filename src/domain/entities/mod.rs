pub mod channels;
pub mod generate_histories;
pub mod posts;
pub mod pricing_plan_histories;
pub mod pricing_plans;
pub mod users;
