use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::{Value, json};

use crate::llm::ReceiptImage;

pub const INSTRUCTION: &str = "Extract restaurant bill details from the image into structured JSON format using extract_bill_data function.";
pub const TOOL_NAME: &str = "extract_bill_data";
const TOOL_DESCRIPTION: &str = "Extracts structured bill information from a restaurant receipt.";

/// Used when neither the bytes nor the upload tell us what kind of image it is
const FALLBACK_MIME_TYPE: &str = "image/png";

#[derive(Debug, Serialize)]
pub struct InputMessage {
    pub role: &'static str,
    pub content: Vec<InputContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    InputText { text: String },
    InputImage { image_url: String },
}

#[derive(Debug, Serialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// The single user message sent for a receipt: instruction first, then the image
pub fn build_input(image: &ReceiptImage) -> Vec<InputMessage> {
    vec![InputMessage {
        role: "user",
        content: vec![
            InputContent::InputText {
                text: INSTRUCTION.to_owned(),
            },
            InputContent::InputImage {
                image_url: data_url(image),
            },
        ],
    }]
}

pub fn bill_tool() -> FunctionTool {
    FunctionTool {
        kind: "function",
        name: TOOL_NAME,
        description: TOOL_DESCRIPTION,
        parameters: bill_schema(),
    }
}

fn bill_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "restaurant": { "type": "string" },
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "quantity": { "type": "number" },
                        "unit_price": { "type": "number" },
                        "total": { "type": "number" }
                    }
                }
            },
            "summary": {
                "type": "object",
                "properties": {
                    "subtotal": { "type": "number" },
                    "taxes": {
                        "type": "object",
                        "properties": {
                            "SGST": { "type": "number" },
                            "CGST": { "type": "number" }
                        }
                    },
                    "round_off": { "type": "number" },
                    "grand_total": { "type": "number" }
                }
            }
        },
        "required": ["restaurant", "items", "summary"]
    })
}

pub fn data_url(image: &ReceiptImage) -> String {
    format!(
        "data:{};base64,{}",
        image_mime_type(image),
        STANDARD.encode(&image.bytes)
    )
}

// sniffed type wins over the declared one, browsers often send octet-stream
fn image_mime_type(image: &ReceiptImage) -> &str {
    if let Some(kind) = infer::get(&image.bytes)
        && kind.matcher_type() == infer::MatcherType::Image
    {
        return kind.mime_type();
    }
    match image.content_type.as_deref() {
        Some(declared) if declared.starts_with("image/") => declared,
        _ => FALLBACK_MIME_TYPE,
    }
}
