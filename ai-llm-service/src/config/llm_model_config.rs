/// Configuration for the generative backend the gateway forwards to.
///
/// Built once at process start (see [`crate::config::default_config`]) and
/// handed to [`crate::services::ollama_service::OllamaService`]; nothing reads
/// the environment after that.
///
/// # Fields
///
/// - `endpoint`: Full generate URL (e.g. `http://ollama:11434/api/generate`).
/// - `model`: Model identifier sent with every request (e.g. `"llama3.2:1b"`).
/// - `timeout_secs`: Upper bound for connect + full stream drain.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::OllamaConfig;
///
/// let cfg = OllamaConfig {
///     endpoint: "http://localhost:11434/api/generate".to_string(),
///     model: "llama3.2:1b".to_string(),
///     timeout_secs: 300,
/// };
/// assert_eq!(cfg.timeout().as_secs(), 300);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Generate endpoint URL.
    pub endpoint: String,

    /// Model identifier string.
    pub model: String,

    /// Deadline for the whole backend interaction, in seconds.
    pub timeout_secs: u64,
}

impl OllamaConfig {
    /// Deadline as a [`std::time::Duration`].
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}
