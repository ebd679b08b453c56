//! LLM prompt engineering for structured extraction

use crate::error::ExtractorError;

const SCHEMA_MARKER: &str = "{{schema}}";
const GUIDANCE_MARKER: &str = "{{guidance}}";
const PROMPT_MARKER: &str = "{{prompt}}";
const ERROR_MARKER: &str = "{{error}}";

/// Placeholders in the order they appear in [`PROMPT_TEMPLATE`]
const MARKERS: [&str; 4] = [SCHEMA_MARKER, GUIDANCE_MARKER, PROMPT_MARKER, ERROR_MARKER];

/// The instruction template every attempt is rendered from
pub const PROMPT_TEMPLATE: &str = r#"You turn a short natural-language request into a JSON object that matches a given schema.
The JSON you return is decoded directly into a typed record, so it must match the schema exactly.

Follow these steps:
    1. Understand the request: read the prompt and work out which values it states.
    2. Fill the schema: produce a JSON object with exactly the keys of the schema and values of the same types.
    3. Respect the constraints: follow the guidance below for allowed values and ranges.
    4. Fill the gaps: give every field the prompt does not mention a sensible default that still satisfies the constraints.
    5. Return JSON only: no markdown, no explanations, nothing but the object.

Example schema:
{
    "name": "",
    "age": 0,
    "email": "",
    "is_active": false
}

Example prompt:
Create a user profile for John Doe, aged 30, with email john.doe@example.com, who is currently active.

Expected output:
{
    "name": "John Doe",
    "age": 30,
    "email": "john.doe@example.com",
    "is_active": true
}

Now process the following schema and prompt. If the error scratch pad is not empty, your previous answer was rejected for the reasons it lists: fix them.

Schema:
{{schema}}

Guidance:
{{guidance}}

Prompt:
{{prompt}}

Error Scratch Pad:
{{error}}
"#;

/// Everything one attempt's prompt is built from
///
/// Built fresh for every attempt; only the error text changes between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptContext<'a> {
    schema: &'a str,
    user_prompt: &'a str,
    guidance: &'a str,
    prior_error: &'a str,
}

impl<'a> PromptContext<'a> {
    /// Create a context with no guidance and an empty scratchpad
    pub fn new(schema: &'a str, user_prompt: &'a str) -> Self {
        Self {
            schema,
            user_prompt,
            ..Self::default()
        }
    }

    /// Type-specific guidance shown next to the schema
    pub fn with_guidance(mut self, guidance: &'a str) -> Self {
        self.guidance = guidance;
        self
    }

    /// Failure text from the previous attempt
    pub fn with_error(mut self, prior_error: &'a str) -> Self {
        self.prior_error = prior_error;
        self
    }

    /// Render the complete prompt
    ///
    /// Placeholders are replaced in a single left-to-right pass over the
    /// template, so text inside the values (including the user's prompt) is
    /// never itself substituted.
    pub fn build(&self) -> Result<String, ExtractorError> {
        let values = [self.schema, self.guidance, self.user_prompt, self.prior_error];
        let capacity = PROMPT_TEMPLATE.len() + values.iter().map(|v| v.len()).sum::<usize>();

        let mut prompt = String::with_capacity(capacity);
        let mut rest = PROMPT_TEMPLATE;
        for (marker, value) in MARKERS.iter().zip(values) {
            let (head, tail) = rest
                .split_once(marker)
                .ok_or_else(|| ExtractorError::Prompt(format!("template is missing {}", marker)))?;
            prompt.push_str(head);
            prompt.push_str(value);
            rest = tail;
        }
        prompt.push_str(rest);

        Ok(prompt)
    }
}

/// Render the prompt for one attempt
pub fn compose(
    schema: &str,
    user_prompt: &str,
    guidance: &str,
    prior_error: &str,
) -> Result<String, ExtractorError> {
    PromptContext::new(schema, user_prompt)
        .with_guidance(guidance)
        .with_error(prior_error)
        .build()
}

/// Check that every placeholder occurs exactly once, in order
pub fn check_template(template: &str) -> Result<(), ExtractorError> {
    let mut last_position = 0;
    for marker in MARKERS {
        let positions: Vec<usize> = template.match_indices(marker).map(|(i, _)| i).collect();
        match positions.as_slice() {
            [position] if *position >= last_position => last_position = *position,
            [_] => return Err(ExtractorError::Prompt(format!("{} is out of order", marker))),
            [] => return Err(ExtractorError::Prompt(format!("template is missing {}", marker))),
            _ => return Err(ExtractorError::Prompt(format!("{} appears more than once", marker))),
        }
    }
    Ok(())
}
