// Prompt constants for resume analysis.
// The schema below and `analysis::model::AnalysisResult` are one contract:
// renaming a field here without updating the model (and ANALYSIS_SCHEMA_VERSION)
// breaks every stored analysis.

use crate::ingest::extract::truncate_chars;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Resume analysis prompt. Replace `{json_only}` and `{resume_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an AI specializing in resume analysis and optimization. Analyze the given resume text and return structured JSON insights with professional recommendations.

Return a JSON object with this EXACT schema:
{
  "skills": {
    "technical": ["Top 10 most relevant technical skills"],
    "soft_skills": ["Key soft skills identified"]
  },
  "experience": {
    "total_years": 0,
    "positions": ["List of job titles held"],
    "industries": ["Industries worked in"],
    "notable_projects": ["Highlight major projects"],
    "career_level": "Entry | Mid | Senior | Executive"
  },
  "education": ["Degrees, certifications, notable coursework"],
  "certifications": ["List of certifications and training programs"],
  "leadership_roles": ["Leadership positions and responsibilities"],
  "missing_keywords": ["Suggested keywords for better job discoverability"],
  "resume_quality_score": 0,
  "job_match_percentage": 0,
  "actionable_improvements": ["Concise recommendations for resume enhancement"],
  "missing_sections": ["List important sections missing (if any)"],
  "summary": "A concise 2-line professional summary highlighting key strengths"
}

FIELD MEANINGS:
- total_years: estimated total years of professional experience, as a number.
- career_level: exactly one of Entry, Mid, Senior, Executive.
- resume_quality_score: number from 1 to 10 based on clarity, ATS optimization and industry relevance.
- job_match_percentage: number from 0 to 100 estimating suitability for the roles the resume targets.
- Every list field is an array of strings. Use [] when nothing applies.

INSTRUCTIONS:
- Extract details using structured analysis of the resume content only.
- Prioritize clarity, ATS (Applicant Tracking System) compatibility and keyword optimization.
- missing_keywords should name terms an ATS would search for that the resume lacks.
- {json_only}

RESUME CONTENT:
{resume_text}
"#;

/// Renders the analysis prompt for at most `max_text_length` characters of resume text.
pub fn build_analysis_prompt(resume_text: &str, max_text_length: usize) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{resume_text}", truncate_chars(resume_text, max_text_length))
}
