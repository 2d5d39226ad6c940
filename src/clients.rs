pub mod gemini;
pub mod naver;

pub use gemini::GeminiClient;
pub use naver::NaverSearchClient;
