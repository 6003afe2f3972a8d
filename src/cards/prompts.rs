use serde::de::DeserializeOwned;

pub fn generate_prompt(user_input: &str) -> String {
    format!(
        r#"You are an expert Anki card creator.
The user will provide a topic or text.
Your goal is to create a high-quality Anki card (Front and Back) and provide a brief explanation or chat response.

User Input:
{user_input}

Output Requirement:
Return a valid JSON object with the following keys:
- "chat": A brief explanation, friendly response, or advice about the generated card.
- "front": The content for the Front of the card (Markdown allowed).
- "back": The content for the Back of the card (Markdown allowed).

Format:
{{
    "chat": "Here is a card regarding...",
    "front": "...",
    "back": "..."
}}

Do not include markdown code block markers (like ```json). Return only the raw JSON string."#
    )
}

pub fn modify_prompt(front: &str, back: &str, instruction: &str) -> String {
    format!(
        r#"You are an assistant editing Anki flashcards.

Original Front:
{front}

Original Back:
{back}

Instruction:
{instruction}

Please provide the modified Front and Back based on the instruction.
Output MUST be a valid JSON object with detailed keys "front" and "back".
Do not include markdown code block markers (```json). Just the raw JSON string."#
    )
}

/// Drop any code fence markers the model wrapped its answer in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(raw))
}
