pub mod model_interpreter;
pub mod stream_models;

pub use model_interpreter::ModelContextInterpreter;
pub use stream_models::StreamModels;
