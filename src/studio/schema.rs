use serde_json::{json, Value};

use crate::studio::options::Mode;

pub fn response_schema(mode: Mode) -> Value {
    match mode {
        Mode::Influencer => influencer_schema(),
        Mode::Website => website_schema(),
    }
}

pub fn influencer_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subject": {"type": "STRING"},
            "detailed_prompt": {"type": "STRING"},
            "negative_prompt": {"type": "STRING"},
            "art_style": {"type": "STRING"},
            "lighting": {"type": "STRING"},
            "camera_settings": {"type": "STRING"},
            "color_palette": {"type": "ARRAY", "items": {"type": "STRING"}},
            "composition": {"type": "STRING"},
            "mood": {"type": "STRING"}
        },
        "required": [
            "subject",
            "detailed_prompt",
            "negative_prompt",
            "art_style",
            "lighting",
            "camera_settings",
            "color_palette",
            "composition",
            "mood"
        ]
    })
}

pub fn website_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "project_name": {
                "type": "STRING",
                "description": "A catchy name for the project"
            },
            "detailed_prompt": {
                "type": "STRING",
                "description": "A highly detailed prompt optimized for AI coding tools like v0.dev, Lovable, or Cursor. It must describe the layout, colors, specific components (shadcn/ui), and functionality."
            },
            "ui_style": {
                "type": "STRING",
                "description": "e.g. Bento Grid, Brutalism, Clean SaaS, Dark Mode"
            },
            "tech_stack": {
                "type": "ARRAY",
                "items": {"type": "STRING"},
                "description": "Recommended stack e.g. React, Tailwind, Framer Motion"
            },
            "color_palette": {
                "type": "ARRAY",
                "items": {"type": "STRING"},
                "description": "Hex codes or Tailwind color names"
            },
            "sections": {
                "type": "ARRAY",
                "items": {"type": "STRING"},
                "description": "List of sections on the landing page"
            },
            "target_audience": {"type": "STRING"}
        },
        "required": [
            "project_name",
            "detailed_prompt",
            "ui_style",
            "tech_stack",
            "color_palette",
            "sections",
            "target_audience"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_fields(schema: &Value) -> Vec<String> {
        schema["required"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|field| field.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn influencer_schema_requires_all_nine_fields() {
        let schema = influencer_schema();
        assert_eq!(schema["type"], "OBJECT");
        let required = required_fields(&schema);
        assert_eq!(required.len(), 9);
        for field in &required {
            assert!(
                schema["properties"][field].is_object(),
                "missing property for required field {field}"
            );
        }
    }

    #[test]
    fn website_schema_requires_all_seven_fields() {
        let schema = website_schema();
        let required = required_fields(&schema);
        assert_eq!(required.len(), 7);
        assert!(required.contains(&"tech_stack".to_string()));
        assert_eq!(
            schema["properties"]["tech_stack"]["items"]["type"],
            "STRING"
        );
    }

    #[test]
    fn response_schema_dispatches_by_mode() {
        assert_eq!(
            response_schema(Mode::Influencer)["required"]
                .as_array()
                .map(Vec::len),
            Some(9)
        );
        assert_eq!(
            response_schema(Mode::Website)["required"]
                .as_array()
                .map(Vec::len),
            Some(7)
        );
    }
}
