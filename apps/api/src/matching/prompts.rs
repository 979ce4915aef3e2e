// Prompt constants for the external match analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Role description for the analysis call. `JSON_ONLY_SYSTEM` is appended at call time.
pub const ANALYSIS_SYSTEM: &str = "You are an AI recruiting assistant that evaluates how well \
    a candidate's resume matches a job posting. Score skills (required and preferred), \
    experience relevance, education fit and overall suitability.";

/// Analysis prompt template.
/// Replace: {grounding_instruction}, {resume_json}, {job_json}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

CANDIDATE RESUME DATA:
{resume_json}

JOB POSTING:
{job_json}

Return a JSON object with this EXACT schema:
{
  "matchPercentage": 0,
  "summary": "1-2 sentence evaluation",
  "requiredSkillsMatch": 0,
  "preferredSkillsMatch": 0,
  "matchingSkills": ["skills the candidate has that the job asks for"],
  "missingRequiredSkills": ["required skills the candidate lacks"],
  "experienceRelevance": 0,
  "experienceAnalysis": "brief analysis of the candidate's experience",
  "strengths": ["3-5 strengths for this role"],
  "weaknesses": ["3-5 areas where the candidate may not fit"],
  "suggestedInterviewQuestions": ["3-5 tailored interview questions"]
}

RULES:
1. Every number is an integer from 0 to 100
2. matchingSkills and missingRequiredSkills use the job's spelling of each skill
3. missingRequiredSkills only lists entries from the job's requiredSkills"#;

/// Role description for the improvement-suggestions call.
pub const SUGGESTIONS_SYSTEM: &str = "You are an expert resume consultant. Compare the \
    candidate's resume with the job requirements and give actionable suggestions that \
    would improve the match, focusing on missing skills and experience gaps.";

/// Suggestions prompt template.
/// Replace: {grounding_instruction}, {resume_json}, {job_json}, {analysis_json}
pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

CANDIDATE RESUME DATA:
{resume_json}

JOB POSTING:
{job_json}

CURRENT MATCH ANALYSIS:
{analysis_json}

Return a JSON object with this EXACT schema:
{
  "summaryOfGaps": "overall summary of the key gaps",
  "skillSuggestions": ["specific skills to add or emphasize"],
  "experienceSuggestions": ["ways to highlight or acquire relevant experience"],
  "resumeFormattingSuggestions": ["formatting changes that make the resume clearer"],
  "keywordSuggestions": ["job-specific keywords to include"],
  "improvementPriorities": ["the suggestions above, most important first"]
}

RULES:
1. Suggest only changes the candidate can truthfully make
2. skillSuggestions should start with the analysis' missingRequiredSkills"#;
