// Prompt constants for blueprint analysis.
// The instruction block is appended verbatim to every prompt; the section
// headings it asks for are the same keywords the extractor anchors on.

/// Trailing instructions describing the response shape. Never varies by input.
pub const ANALYSIS_INSTRUCTIONS: &str = "\
Considering the context of the uploaded diagrams (files), please analyze the uploaded service blueprint and any other additional materials. Structure your response as follows:

Granular SWOT Analysis for each step of the blueprint or journey map:
- Strengths:
[List key strengths identified in the blueprint]
- Weaknesses:
[List key weaknesses identified in the blueprint]
- Opportunities:
[List key opportunities identified in the blueprint]
- Threats:
[List key threats identified in the blueprint]

Improvements:
1. [First improvement with detailed steps]
2. [Second improvement with detailed steps]
[Continue with numbered improvements as needed]

If there is any existing related case study, provide a link to read and learn more about the potential improvements.

Please focus on the user experience, pain points, and potential improvements relevant to the service blueprint.
";
