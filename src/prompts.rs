//! Centralized prompt definitions.
//!
//! System prompts for every agent, plus the user-prompt templates the
//! content and summarizer agents wrap their input in.

/// System prompt for the joke-telling agent
pub const JOKER_SYSTEM_PROMPT: &str = "You are good at telling jokes.";

/// System prompt for the weather agent
pub const WEATHER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that can provide weather information.";

/// System prompt for the website content retrieval agent
pub const GET_CONTENT_SYSTEM_PROMPT: &str = r#"You are an agent that retrieves website content.
When given a URL, use the get_website_content tool to fetch the content and return it.
Extract and return the main text content from the website."#;

/// System prompt for the summarizer agent
pub const SUMMARIZE_SYSTEM_PROMPT: &str = r#"You are an expert content summarizer. Your task is to:
1. Analyze the provided text content
2. Extract the key points and main ideas
3. Create a concise summary in bulleted list format
4. Focus on the most important information
5. Keep each bullet point clear and brief

Format your response as a bulleted list using bullet points (•).
Each bullet should be a complete, standalone point.
Aim for 5-8 key points that capture the essence of the content."#;

/// Prompt asking the content agent to fetch a URL
pub fn get_content_prompt(url: &str) -> String {
    format!("Please fetch and return the content from this URL: {}", url)
}

/// Prompt asking the summarizer to condense content
pub fn summarize_prompt(content: &str) -> String {
    format!(
        "Please summarize the following content into a concise bulleted list:\n\n{}",
        content
    )
}
