pub mod groq; // Groq/OpenAI-compatible vision model client
pub mod imgbb; // ImgBB image hosting with data-URL fallback
pub mod interpreter; // Model response -> typed nutrition result

pub use groq::{GroqVisionClient, VisionService};
pub use imgbb::{ImageHost, ImgBbClient};
