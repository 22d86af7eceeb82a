//! Markdown output

use tabled::{builder::Builder, settings::Style};

use super::{Block, ReportDocument};

pub fn render_markdown(doc: &ReportDocument) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", doc.title));

    for block in &doc.blocks {
        match block {
            Block::Fields { heading, fields } => {
                output.push_str(&format!("## {}\n\n", heading));
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (label, value) in fields {
                    builder.push_record([label.as_str(), value.as_str()]);
                }
                output.push_str(&builder.build().with(Style::markdown()).to_string());
                output.push_str("\n\n");
            }
            Block::Item {
                position,
                question,
                answer,
                photo,
                action_plan,
            } => {
                output.push_str(&format!("### {}. {}\n\n", position, question));
                let answer = answer.map(|a| a.label()).unwrap_or("Unanswered");
                output.push_str(&format!("- **Answer:** {}\n", answer));
                if let Some(photo) = photo {
                    output.push_str(&format!("- **Photo:** {}\n", photo));
                }
                if let Some(plan) = action_plan {
                    output.push_str(&format!("- **Action plan:** {}\n", plan));
                }
                output.push('\n');
            }
            Block::Notice { text } => {
                output.push_str(&format!("_{}_\n\n", text));
            }
        }
    }

    output.push_str(&format!("---\n{} page(s)\n", doc.page_count()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_rows;
    use crate::report::EMPTY_NOTICE;

    #[test]
    fn test_markdown_sections() {
        let doc = ReportDocument::build(&sample_rows(15, &[0, 14]), None);
        let md = render_markdown(&doc);

        assert!(md.starts_with("# Equipment Checklist Report"));
        assert!(md.contains("## Equipment"));
        assert!(md.contains("| Project name"));
        assert!(md.contains("### 15. Question number 15"));
        assert_eq!(md.matches("**Action plan:**").count(), 2);
    }

    #[test]
    fn test_markdown_empty() {
        let md = render_markdown(&ReportDocument::build(&[], None));
        assert!(md.contains(EMPTY_NOTICE));
        assert!(!md.contains("## Results"));
    }
}
