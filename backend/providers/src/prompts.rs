//! Prompt text for the two model calls.

/// Instructions for turning an application idea into an image search query.
pub fn search_query_prompt(application_idea: &str) -> String {
    format!(
        "Write one image search query for finding UI design inspiration for the \
         application idea below. Lead with the product domain (ecommerce, analytics \
         dashboard, fintech, CRM, ...), keep the idea's subject central, and add at \
         most two qualifiers such as \"UI\", \"website\" or \"mobile app\". Skip \
         generic adjectives like \"modern\" or \"minimal\".\n\n\
         Application idea: \"{application_idea}\"\n\n\
         Reply with the query only."
    )
}

/// Instructions for extracting a reusable design system from a screenshot.
pub const DESIGN_ANALYSIS_PROMPT: &str = "\
Extract the reusable design system from this interface image, ignoring what \
the screens are about. Answer in markdown with these sections:

1. **Color System**: primary, secondary, accent, background, surface, text and \
border colors, each with a hex code where identifiable.
2. **Typography**: families, size scale, weights, line height.
3. **Spacing & Layout**: spacing scale, grid, density.
4. **Corners**: border radius values.
5. **Elevation**: shadows, layering, borders.
6. **Components**: buttons, cards, inputs, icons.
7. **Design Philosophy**: overall aesthetic and signature traits.";
