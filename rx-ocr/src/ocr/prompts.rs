//! Fixed prompt templates sent to the extraction model.

/// Returned in place of an empty model answer.
pub const NO_TEXT_FALLBACK: &str = "No text could be extracted from the image.";

/// Connectivity check used by `/test-gemini`.
pub const DIAGNOSTIC_PROMPT: &str = "Say hello";

/// Instruction paired with the prescription image.
///
/// # Example
/// ```
/// use rx_ocr::ocr::prompts::prescription_extraction_prompt;
///
/// let prompt = prescription_extraction_prompt();
/// assert!(prompt.contains("[ILLEGIBLE]"));
/// ```
pub fn prescription_extraction_prompt() -> &'static str {
    r#"You are an expert medical text extraction system. Please extract all text from this prescription image.

Focus on:
- Patient information
- Doctor information
- Medication names and dosages
- Instructions for use
- Date and other relevant details

Please format the extracted text clearly and maintain the structure as much as possible.
If you cannot read certain parts, indicate with [UNCLEAR] or [ILLEGIBLE].

Return only the extracted text without any additional commentary."#
}
