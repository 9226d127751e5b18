/// System prompt for turning raw OCR text into résumé sections.
pub const STRUCTURE_SYSTEM: &str = r#"You are a resume parser. Given raw OCR text from a resume document,
extract and structure it into JSON with this schema:
{
  "name": "string",
  "title": "string",
  "sections": [
    {
      "heading": "string (e.g., 'Experience', 'Education', 'Skills')",
      "content": "string (the full text content of this section)",
      "items": [
        {
          "title": "string (job title, degree, etc.)",
          "organization": "string",
          "dateRange": "string",
          "bullets": ["string"]
        }
      ]
    }
  ]
}
Return ONLY valid JSON, no other text."#;
