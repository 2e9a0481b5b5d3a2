//! Prompt templates for test-case generation.

use crate::dtos::LanguageMode;

const GHERKIN_TEMPLATE: &str = "\
You are a test automation specialist. Create Gherkin feature file test cases based on the images provided.
The test cases should follow the Given-When-Then format and be comprehensive.

Requirements:
- Create a Feature description
- Generate at least 3-5 Scenarios
- Each Scenario should have clear Given, When, Then steps
- Use appropriate tags where necessary
- Include parameters and examples where appropriate
- Format the output as a valid .feature file";

const TRADITIONAL_TEMPLATE: &str = "\
You are a test automation specialist. Create traditional test cases in a tabular format based on the images provided.

Requirements:
- Present test cases in a structured format with these sections for each test case:
  - Test Case ID (e.g., TC001)
  - Description: Brief description of what the test case verifies
  - Preconditions: What must be true before executing the test
  - Steps: Numbered list of actions to perform
  - Expected Results: What should happen when steps are executed
  - Priority: High, Medium, or Low importance
- Generate at least 5-7 comprehensive test cases
- Include test cases for different scenarios including edge cases
- Assign appropriate priority to each test case";

/// Build the prompt text for a mode, with the caller's free-text context
/// appended verbatim when present.
pub fn build_prompt(mode: LanguageMode, additional_info: Option<&str>) -> String {
    let template = match mode {
        LanguageMode::Gherkin => GHERKIN_TEMPLATE,
        LanguageMode::Traditional => TRADITIONAL_TEMPLATE,
    };

    match additional_info {
        Some(info) => format!(
            "{}\n\nAdditional information about the test requirements: {}",
            template, info
        ),
        None => template.to_string(),
    }
}
