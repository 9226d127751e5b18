//! Authored résumé chapters. Add, remove or reorder entries here; every
//! consumer (search, agent briefing, image prompts) picks them up.

use super::{Chapter, Project};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn project(name: &str, url: &str, description: &str, status: &str) -> Project {
    Project {
        name: name.to_string(),
        url: url.to_string(),
        description: description.to_string(),
        status: Some(status.to_string()),
    }
}

pub fn authored_chapters() -> Vec<Chapter> {
    vec![
        Chapter {
            id: "global-investor".to_string(),
            order: 1,
            title: "The Global Investor".to_string(),
            subtitle: "A technology investor with global perspective and deep domain expertise across 200+ technology companies.".to_string(),
            date_range: "2011 – 2026".to_string(),
            bullet_points: strings(&[
                "Brendan began his career in institutional asset management in 2010 after studying in Boston. He also attended Sciences Po in Paris in Spring 2009. ",
                "Over 15 years, he developed deep domain expertise across 200+ technology companies spanning software, semiconductors, AI infrastructure, and application-layer platforms.",
                "He has traveled to 56 countries — including Australia, Indonesia, Chile, South Africa, China...etc*.",
                "Based in Boston + Cape Cod",
                "*Argentina, Australia, Austria, Belgium, Brazil, Canada, Chile, China, Czech Republic, Denmark, Egypt, Finland, France, Germany, Hong Kong, Iceland, Indonesia, Italy, Japan, Malaysia, Netherlands, New Zealand, Norway, Portugal, Singapore, South Africa, Spain, Sweden, Switzerland, Thailand, United Kingdom, United States, Uruguay, Vietnam.",
            ]),
            image_prompt: "Cinematic editorial portrait of a Boston-based global technology investor in a refined office at dusk, subtle world map with highlighted routes across 56 countries, travel passports and notebooks on desk, faint Paris postcard and Sciences Po 2009 reference pinned on a board, atmosphere of disciplined long-horizon research, warm amber and deep navy tones, photorealistic, high detail".to_string(),
            tags: strings(&[
                "Technology Investing",
                "Global Equities",
                "Sciences Po '09",
                "56 Countries",
                "Boston",
            ]),
            projects: vec![],
            accent_color: None,
        },
        Chapter {
            id: "five-billion-strategy".to_string(),
            order: 2,
            title: "The $5B Strategy".to_string(),
            subtitle: "A front-row seat to the most consequential era in technology markets — and a key role in 10x-ing the portfolio.".to_string(),
            date_range: "2015 – 2026".to_string(),
            bullet_points: strings(&[
                "Brendan was a key member of the team that scaled a global technology equity strategy from roughly $500M to over $5B in AUM — a 10x expansion driven by sustained outperformance, not asset gathering.",
                "He invested through the full cycle: pre-pandemic cloud acceleration, pandemic-era digital adoption, the 2022 rate shock, and the generative AI inflection — adapting process to each regime while maintaining conviction.",
                "He built repeatable, institutional-grade research workflows that reduced preparation time by 60% — a foreshadowing of the automation instincts he'd later apply to AI engineering.",
            ]),
            image_prompt: "High-end cinematic scene of a global technology equity strategy war room showing growth from $500M to $5B over a decade, multiple monitors with long-term performance curves and market regime markers (pre-pandemic, pandemic, post-pandemic), documents on software, semiconductors, and AI infrastructure, visual cue of faster research workflows with automated dashboards, institutional and precise mood, photorealistic, dramatic teal-orange lighting".to_string(),
            tags: strings(&[
                "$500M → $5B",
                "19–21% CAGR",
                "Semiconductors",
                "Software",
                "AI Infrastructure",
                "Process Design",
            ]),
            projects: vec![],
            accent_color: None,
        },
        Chapter {
            id: "the-builder".to_string(),
            order: 3,
            title: "The Builder".to_string(),
            subtitle: "A builder of applied AI products that solve real problems.".to_string(),
            date_range: "2022 – 2026".to_string(),
            bullet_points: strings(&[
                "Brendan is shipping full-stack AI applications (Python + TypeScript + Next.js + Vercel) integrated with frontier model APIs.",
                "He is AWS Certified (Cloud Practitioner, AI Practitioner) and Nvidia certified (GenAI/LLM Professional, Agentic AI Professional)",
                "Brendan is targeting Applied AI Engineer roles — positions where deep domain knowledge in technology markets can be applied to solve real problems.",
            ]),
            image_prompt: "Cinematic applied-AI builder workspace in Boston with dual monitors showing TypeScript, Python, Next.js, and deployed Vercel dashboards, visible project cards for AI tools in progress, certification badges for AWS and NVIDIA on a side display, notebook with role target notes for Applied AI Engineer, mood of focused execution and real-world problem solving, photorealistic, modern editorial style, rich contrast and depth".to_string(),
            tags: strings(&[
                "TypeScript",
                "Next.js",
                "RAG Systems",
                "Vercel",
                "NVIDIA Cert",
                "Applied AI",
            ]),
            projects: vec![
                project(
                    "Traverse",
                    "https://traverse-mu.vercel.app/",
                    "AI visa application auditor covering 37,800+ travel corridors in 100+ languages. Built for a hackathon — reviews documents like an immigration expert to catch the errors that cause preventable rejections.",
                    "Hackathon",
                ),
                project(
                    "LLM DCF Model",
                    "https://llm-dcf.vercel.app/",
                    "AI-powered discounted cash flow model generator. Select a ticker, adjust segment-level growth assumptions with real earnings context, and get a fair value estimate — institutional-grade financial modeling in the browser.",
                    "Live",
                ),
                project(
                    "Clarity 3.0",
                    "https://bme-clarity-3.vercel.app/",
                    "RAG-powered earnings analysis system. Upload transcripts, ask questions in natural language, get cited answers grounded in the source material. The research workflow Brendan wished existed for 15 years.",
                    "Live",
                ),
                project(
                    "EuroTrip Planner",
                    "https://eurotrip-planner.vercel.app/",
                    "Personalized European travel recommendations across 220+ cities with real-time weather, crowd, and seasonal event data. Data-driven trip planning from someone who's visited 56 countries.",
                    "In Development",
                ),
                project(
                    "Full Project Portfolio",
                    "https://vercel.com/brendans-projects-5b1c1e68/bme-projects-nov2025",
                    "The complete collection — every app Brendan has built and deployed.",
                    "Portfolio",
                ),
            ],
            accent_color: None,
        },
    ]
}
