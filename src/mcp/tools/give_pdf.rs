//! Tool definition for converting Word documents to PDF.

use serde_json::{json, Value};

use super::registry::ToolDescriptor;

pub const TOOL_NAME: &str = "give_pdf";

/// Names older clients still call the tool by.
pub const ALIASES: [&str; 2] = ["give pdf", "convert_word_to_pdf"];

pub fn matches(name: &str) -> bool {
    name == TOOL_NAME || ALIASES.contains(&name)
}

/// Get the tool descriptor for MCP tools/list.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME.to_string(),
        description: concat!(
            "Convert a Word (.docx) file to PDF from attachment, URL, or local path. ",
            "Saves the PDF to FILES_DIR and returns a downloadable file URL. ",
            "Provide exactly one source; if several are given, file_base64 wins over ",
            "puch_file_data, which wins over docx_source."
        )
        .to_string(),
        input_schema: input_schema(),
    }
}

fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "docx_source": {
                "type": "string",
                "description": "http(s) URL or local path of the .docx file"
            },
            "output_path": {
                "type": "string",
                "description": "Optional path the PDF is written to before being published"
            },
            "file_base64": {
                "type": "string",
                "description": "The .docx file encoded as standard base64"
            },
            "puch_file_data": {
                "type": "string",
                "description": "Attachment data: base64 document or attachment ID"
            },
            "filename": {
                "type": "string",
                "description": "Name for the resulting PDF (extension is replaced with .pdf)"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let desc = descriptor();
        assert_eq!(desc.name, TOOL_NAME);
        assert!(desc.description.contains("PDF"));
        assert!(desc.input_schema["properties"]["docx_source"].is_object());
    }

    #[test]
    fn test_aliases() {
        assert!(matches("give_pdf"));
        assert!(matches("give pdf"));
        assert!(matches("convert_word_to_pdf"));
        assert!(!matches("give_png"));
    }
}
