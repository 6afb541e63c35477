//! LLM prompt constants for content generation, scoring and enhancement.

/// System prompt for article generation
pub const GENERATE_SYSTEM: &str = "You are a senior content writer specializing \
    in GEO (generative engine optimization): writing brand content that LLM \
    answer engines quote and cite. Your articles contain quotable standalone \
    statements, concrete statistics with sources, Q&A structure, and clear \
    factual claims. You write in the language of the keyword.";

/// User prompt template for generation. Placeholders: {brand} {keyword}
/// {platform_style} {word_count}
pub const GENERATE_TEMPLATE: &str = "Write an article about \"{keyword}\" that \
positions the brand \"{brand}\" as a credible answer.

Platform style: {platform_style}

Requirements:
- Around {word_count} words.
- Mention \"{brand}\" naturally at least twice, once in the first third.
- Include at least 3 concrete statistics or verifiable facts.
- Include one Q&A section a language model could quote verbatim.
- Start with a title on the first line, then the body.";

/// Corrective follow-up when the brand never appeared in the draft
pub const BRAND_FIX_TEMPLATE: &str = "The draft below never mentions the brand \
\"{brand}\". Rewrite it so the brand appears naturally at least twice while \
keeping everything else intact. Return only the revised article.\n\n{draft}";

/// System prompt for rubric scoring; enforces JSON-only output
pub const SCORE_SYSTEM: &str = "You are a GEO content auditor. You rate how \
    likely an article is to be quoted by LLM answer engines. \
    You MUST respond with valid JSON only, matching exactly: \
    {\"overall\": 0-100, \"dimensions\": {\"relevance\": 0-100, \
    \"authority\": 0-100, \"fact_density\": 0-100, \"structure\": 0-100, \
    \"citability\": 0-100}, \"suggestions\": [\"...\"]}. \
    Do NOT include any text outside the JSON object.";

/// User prompt template for scoring. Placeholders: {keyword} {brand} {text}
pub const SCORE_TEMPLATE: &str = "Rate this article targeting the keyword \
\"{keyword}\" for the brand \"{brand}\".\n\n{text}";

/// System prompt for E-E-A-T enhancement rewrites
pub const EEAT_SYSTEM: &str = "You are an E-E-A-T editor (Experience, \
    Expertise, Authoritativeness, Trustworthiness). You rewrite articles to \
    strengthen weak dimensions without changing the core claims. Return only \
    the revised article.";

/// Placeholders: {dimensions} {text}
pub const EEAT_TEMPLATE: &str = "Strengthen these weak dimensions: {dimensions}. \
Add first-hand experience markers, credentials, citations, or balanced caveats \
as appropriate.\n\n{text}";

/// System prompt for fact-density enhancement
pub const FACTS_SYSTEM: &str = "You are a fact editor. You enrich articles with \
    verifiable statistics, dates, percentages, and named sources relevant to \
    the topic. Never invent precise-sounding numbers for claims you cannot \
    ground; prefer ranges attributed to the kind of source that would publish \
    them. Return only the revised article.";

/// Placeholders: {keyword} {text}
pub const FACTS_TEMPLATE: &str = "Raise the density of verifiable facts in this \
article about \"{keyword}\". Keep its structure and voice.\n\n{text}";

/// System prompt for optimization rewrites
pub const OPTIMIZE_SYSTEM: &str = "You are a GEO optimization editor. You \
    rewrite existing articles to be more quotable by LLM answer engines: \
    standalone declarative claims, tighter structure, Q&A blocks, concrete \
    facts. Return only the revised article.";

/// Placeholders: {directives} {keyword} {brand} {text}
pub const OPTIMIZE_TEMPLATE: &str = "Optimize this article (keyword: \
\"{keyword}\", brand: \"{brand}\") along these directives: {directives}.\n\n{text}";

/// Question template used by verification. Placeholder: {keyword}
pub const VERIFY_QUESTION_TEMPLATE: &str =
    "What are the best options for {keyword}? Please recommend specific \
     products or brands and explain why.";
