use crate::models::GenerationRequest;

const HEADLINE_FIXED_SUFFIX: &str = " (Important: Headline fixed, dont change it)";
const SUBLINE_FIXED_SUFFIX: &str = " (Important: Subline fixed, dont change it)";

const FORMATTING_RULE: &str = "\nSTRICT FORMATTING RULE: \n\
- If the user uses quotation marks in the Headline or Subline, YOU MUST include them in the final render. \n\
- If the user DOES NOT use quotation marks, you are FORBIDDEN from adding them. Use the text exactly as provided.\n";

const NO_PERSONS_RULE: &str =
    "\nIMPORTANT: It is forbidden to show any persons in the image.\n";

/// Formats the up-to-three headline lines for the webhook payload.
/// Blank lines are skipped; the remaining ones are numbered by their
/// order of occurrence.
pub fn format_headline(line1: &str, line2: &str, line3: &str) -> String {
    [line1, line2, line3]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| format!("Line {}: {}", idx + 1, line))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Constructs the standardized generation prompt. Pure and
/// deterministic; every submission and regeneration goes through here.
pub fn construct_prompt(ctx: &GenerationRequest) -> String {
    let mut prompt = format!("Topic: {}\n", ctx.topic);

    let headline = format_headline(&ctx.headline_line1, &ctx.headline_line2, &ctx.headline_line3);
    if !headline.is_empty() {
        prompt.push_str(&format!(
            "Headline: {}{}\n",
            headline,
            if ctx.headline_fixed {
                HEADLINE_FIXED_SUFFIX
            } else {
                ""
            }
        ));
    }

    if !ctx.subline.trim().is_empty() {
        prompt.push_str(&format!(
            "Subline: {}{}\n",
            ctx.subline,
            if ctx.subline_fixed {
                SUBLINE_FIXED_SUFFIX
            } else {
                ""
            }
        ));
    }

    prompt.push_str(FORMATTING_RULE);

    if !ctx.background_info.trim().is_empty() {
        prompt.push_str(&format!("Background Image Details: {}\n", ctx.background_info));
    }

    if ctx.include_person && !ctx.person_description.trim().is_empty() {
        prompt.push_str(&format!(
            "\nPerson to include: {}\n",
            ctx.person_description
        ));
    } else {
        prompt.push_str(NO_PERSONS_RULE);
    }

    prompt.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "Housing market".into(),
            ..Default::default()
        }
    }

    #[test]
    fn headline_skips_blank_lines_and_renumbers() {
        assert_eq!(format_headline("A", "", "C"), "Line 1: A, Line 2: C");
        assert_eq!(format_headline("", "  ", ""), "");
        assert_eq!(format_headline("Only", "", ""), "Line 1: Only");
    }

    #[test]
    fn prompt_is_idempotent() {
        let ctx = GenerationRequest {
            headline_line1: "RENTS".into(),
            headline_line3: "EXPLODE".into(),
            subline: "\"Nobody saw it coming\"".into(),
            headline_fixed: true,
            ..request()
        };
        assert_eq!(construct_prompt(&ctx), construct_prompt(&ctx));
    }

    #[test]
    fn prompt_always_starts_with_topic_line() {
        let prompt = construct_prompt(&request());
        assert!(prompt.starts_with("Topic: Housing market"));
    }

    #[test]
    fn fixed_suffixes_follow_their_lines() {
        let ctx = GenerationRequest {
            headline_line1: "RENTS".into(),
            subline: "Prices up".into(),
            headline_fixed: true,
            subline_fixed: true,
            ..request()
        };
        let prompt = construct_prompt(&ctx);
        assert!(prompt
            .contains("Headline: Line 1: RENTS (Important: Headline fixed, dont change it)"));
        assert!(prompt.contains("Subline: Prices up (Important: Subline fixed, dont change it)"));
    }

    #[test]
    fn blank_headline_and_subline_are_omitted() {
        let prompt = construct_prompt(&request());
        assert!(!prompt.contains("Headline:"));
        assert!(!prompt.contains("Subline:"));
    }

    #[test]
    fn formatting_rule_is_always_present() {
        assert!(construct_prompt(&request()).contains("STRICT FORMATTING RULE"));
    }

    #[test]
    fn exactly_one_person_clause() {
        let without = construct_prompt(&request());
        assert!(without.contains("It is forbidden to show any persons"));
        assert!(!without.contains("Person to include:"));

        let with = construct_prompt(&GenerationRequest {
            include_person: true,
            person_description: "a tired commuter".into(),
            ..request()
        });
        assert!(with.contains("Person to include: a tired commuter"));
        assert!(!with.contains("It is forbidden to show any persons"));
    }

    #[test]
    fn person_flag_without_description_falls_back_to_prohibition() {
        let prompt = construct_prompt(&GenerationRequest {
            include_person: true,
            person_description: "   ".into(),
            ..request()
        });
        assert!(prompt.contains("It is forbidden to show any persons"));
    }

    #[test]
    fn background_details_only_when_present() {
        let prompt = construct_prompt(&GenerationRequest {
            background_info: "rainy skyline".into(),
            ..request()
        });
        assert!(prompt.contains("Background Image Details: rainy skyline"));
        assert!(!construct_prompt(&request()).contains("Background Image Details"));
    }

    #[test]
    fn output_is_trimmed() {
        let prompt = construct_prompt(&request());
        assert_eq!(prompt, prompt.trim());
    }
}
