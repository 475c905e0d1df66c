use serde_json::Value;

use crate::config::{
    ENHANCE_INFLUENCER_CONTEXT, ENHANCE_USER_PROMPT, ENHANCE_WEBSITE_CONTEXT,
    INFLUENCER_SYSTEM_PROMPT, WEBSITE_SYSTEM_PROMPT,
};
use crate::studio::options::{
    CameraStyle, DesignStyle, DetailLevel, LightingStyle, Mode, SiteType,
};
use crate::studio::schema::response_schema;

pub const INFLUENCER_TEMPERATURE: f32 = 0.85;
pub const WEBSITE_TEMPERATURE: f32 = 0.7;

const GOAL_CONSTRAINT: &str =
    "GOAL: Generate a JSON prompt for a 100% PHOTOREALISTIC AI INFLUENCER image.";
const SKIN_TEXTURE_CONSTRAINT: &str = "SKIN TEXTURE: You MUST explicitly include terms like 'visible skin pores', 'natural skin texture', 'vellus hair' (peach fuzz), 'flyaway hairs', 'slight wrinkles', and 'natural imperfections'. AVOID plastic/smooth skin.";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub description: String,
    pub mode: Mode,
    pub detail: Option<DetailLevel>,
    pub camera: Option<CameraStyle>,
    pub lighting: Option<LightingStyle>,
    pub site_type: Option<SiteType>,
    pub design_style: Option<DesignStyle>,
}

impl GenerationRequest {
    pub fn influencer(description: impl Into<String>) -> Self {
        GenerationRequest {
            description: description.into(),
            mode: Mode::Influencer,
            detail: None,
            camera: None,
            lighting: None,
            site_type: None,
            design_style: None,
        }
    }

    pub fn website(description: impl Into<String>) -> Self {
        GenerationRequest {
            description: description.into(),
            mode: Mode::Website,
            detail: None,
            camera: None,
            lighting: None,
            site_type: None,
            design_style: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub mode: Mode,
    pub system_instruction: String,
    pub user_content: String,
    pub response_schema: Value,
    pub temperature: f32,
}

pub fn build_prompt_plan(request: &GenerationRequest) -> PromptPlan {
    match request.mode {
        Mode::Influencer => build_influencer_plan(request),
        Mode::Website => build_website_plan(request),
    }
}

fn influencer_constraints(request: &GenerationRequest) -> Vec<String> {
    let mut constraints = vec![
        GOAL_CONSTRAINT.to_string(),
        SKIN_TEXTURE_CONSTRAINT.to_string(),
    ];
    if let Some(clause) = request.camera.and_then(CameraStyle::constraint) {
        constraints.push(clause);
    }
    if let Some(clause) = request.lighting.and_then(LightingStyle::constraint) {
        constraints.push(clause);
    }
    constraints
}

fn build_influencer_plan(request: &GenerationRequest) -> PromptPlan {
    let detail = request.detail.unwrap_or(DetailLevel::DEFAULT);
    let system_instruction =
        INFLUENCER_SYSTEM_PROMPT.replace("{detail_instruction}", detail.instruction());
    let user_content = format!(
        "User Input: \"{}\"\n\nCONSTRAINTS:\n{}",
        request.description,
        influencer_constraints(request).join("\n- ")
    );
    PromptPlan {
        mode: Mode::Influencer,
        system_instruction,
        user_content,
        response_schema: response_schema(Mode::Influencer),
        temperature: INFLUENCER_TEMPERATURE,
    }
}

fn build_website_plan(request: &GenerationRequest) -> PromptPlan {
    let site_type = request.site_type.unwrap_or(SiteType::Landing);
    let design_style = request.design_style.unwrap_or(DesignStyle::Minimal);
    let user_content = format!(
        "User Idea: \"{}\"\nSite Type: \"{}\"\nDesign Style: \"{}\"\n\nGenerate a JSON response describing this website project.\nThe 'detailed_prompt' should be ready to copy-paste into v0.dev or Cursor Composer.",
        request.description,
        site_type.label(),
        design_style.label()
    );
    PromptPlan {
        mode: Mode::Website,
        system_instruction: WEBSITE_SYSTEM_PROMPT.to_string(),
        user_content,
        response_schema: response_schema(Mode::Website),
        temperature: WEBSITE_TEMPERATURE,
    }
}

pub fn enhance_instruction(mode: Mode) -> &'static str {
    match mode {
        Mode::Influencer => ENHANCE_INFLUENCER_CONTEXT,
        Mode::Website => ENHANCE_WEBSITE_CONTEXT,
    }
}

pub fn enhance_user_content(description: &str) -> String {
    ENHANCE_USER_PROMPT.replace("{input}", description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influencer_plan_uses_selected_detail_instruction() {
        let mut request = GenerationRequest::influencer("beach portrait");
        request.detail = Some(DetailLevel::HyperReal);
        let plan = build_prompt_plan(&request);
        assert!(plan
            .system_instruction
            .contains(DetailLevel::HyperReal.instruction()));
        assert_eq!(plan.mode, Mode::Influencer);
        assert_eq!(plan.temperature, INFLUENCER_TEMPERATURE);
    }

    #[test]
    fn missing_detail_falls_back_to_high_fidelity() {
        let request = GenerationRequest::influencer("beach portrait");
        let plan = build_prompt_plan(&request);
        assert!(plan
            .system_instruction
            .contains(DetailLevel::HighFidelity.instruction()));
    }

    #[test]
    fn ultra_wide_camera_clause_appears_exactly_once() {
        let mut request = GenerationRequest::influencer("mirror selfie at a rooftop party");
        request.camera = Some(CameraStyle::UltraWide);
        let plan = build_prompt_plan(&request);
        let count = plan
            .user_content
            .matches("Ultra-wide angle 0.6x lens")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn auto_selections_add_no_style_constraints() {
        let mut request = GenerationRequest::influencer("city walk");
        request.camera = Some(CameraStyle::Auto);
        request.lighting = Some(LightingStyle::Auto);
        let plan = build_prompt_plan(&request);
        assert!(!plan.user_content.contains("CAMERA"));
        assert!(!plan.user_content.contains("LIGHTING"));
        assert!(plan.user_content.contains(GOAL_CONSTRAINT));
        assert!(plan.user_content.contains(SKIN_TEXTURE_CONSTRAINT));
    }

    #[test]
    fn constraint_block_join_format_is_stable() {
        let mut request = GenerationRequest::influencer("coffee shop candid");
        request.lighting = Some(LightingStyle::GoldenHour);
        let plan = build_prompt_plan(&request);
        let expected = format!(
            "User Input: \"coffee shop candid\"\n\nCONSTRAINTS:\n{}\n- {}\n- LIGHTING: Use \"Golden Hour (Sunset)\".",
            GOAL_CONSTRAINT, SKIN_TEXTURE_CONSTRAINT
        );
        assert_eq!(plan.user_content, expected);
    }

    #[test]
    fn website_plan_interpolates_type_and_style_labels() {
        let mut request = GenerationRequest::website("app for plant care reminders");
        request.site_type = Some(SiteType::Saas);
        request.design_style = Some(DesignStyle::Bento);
        let plan = build_prompt_plan(&request);
        assert!(plan.user_content.contains("Site Type: \"SaaS Product\""));
        assert!(plan.user_content.contains("Design Style: \"Bento Grid\""));
        assert_eq!(plan.temperature, WEBSITE_TEMPERATURE);
        assert_eq!(plan.mode, Mode::Website);
    }

    #[test]
    fn website_plan_defaults_to_landing_and_minimal() {
        let request = GenerationRequest::website("bakery site");
        let plan = build_prompt_plan(&request);
        assert!(plan.user_content.contains("Site Type: \"Landing Page\""));
        assert!(plan.user_content.contains("Design Style: \"Minimal & Clean\""));
    }

    #[test]
    fn enhance_content_embeds_the_input() {
        let content = enhance_user_content("girl with red hair");
        assert!(content.contains("Input: \"girl with red hair\""));
        assert!(enhance_instruction(Mode::Influencer).contains("photography"));
        assert!(enhance_instruction(Mode::Website).contains("UI/UX"));
    }
}
