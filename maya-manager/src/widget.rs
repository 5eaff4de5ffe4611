//! The browser chat page

use maya_core::config::ChatConfig;

const TEMPLATE: &str = include_str!("widget.html");

/// Render the chat page with the configured title, subtitle and placeholder.
///
/// Placeholders are filled in a single pass over the template, so configured
/// text is never scanned for further placeholders.
pub fn render(chat: &ChatConfig) -> String {
    let mut page = String::with_capacity(TEMPLATE.len() + 256);
    let mut rest = TEMPLATE;

    while let Some(start) = rest.find("{{") {
        page.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("}}") else {
            rest = &rest[start..];
            break;
        };

        match &tail[..end] {
            "TITLE" => page.push_str(&escape_html(&chat.title)),
            "SUBTITLE" => page.push_str(&escape_html(&chat.subtitle)),
            "PLACEHOLDER" => page.push_str(&escape_html(&chat.placeholder)),
            other => {
                page.push_str("{{");
                page.push_str(other);
                page.push_str("}}");
            }
        }
        rest = &tail[end + 2..];
    }

    page.push_str(rest);
    page
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_page() {
        let page = render(&ChatConfig::default());
        assert!(page.contains("<h1>Maya Chatbot</h1>"));
        assert!(page.contains("I&#39;m live! Ask me anything."));
        assert!(page.contains("placeholder=\"Talk to Maya...\""));
        assert!(page.contains("Thinking..."));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_escapes_config_text() {
        let chat = ChatConfig {
            title: "<script>alert(1)</script>".to_string(),
            placeholder: "say \"hi\"".to_string(),
            ..Default::default()
        };
        let page = render(&chat);
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("say &quot;hi&quot;"));
    }

    #[test]
    fn test_render_does_not_expand_markers_in_config_text() {
        let chat = ChatConfig {
            title: "Ask {{PLACEHOLDER}}".to_string(),
            placeholder: "type here".to_string(),
            ..Default::default()
        };
        let page = render(&chat);
        assert!(page.contains("<h1>Ask {{PLACEHOLDER}}</h1>"));
        assert!(!page.contains("Ask type here"));
    }
}
