//! Discord-compatible webhook message envelope.

use serde::{Deserialize, Serialize};

use crate::markup::{extract_image, html_to_markdown, strip_images};

/// Embed accent color.
pub const EMBED_COLOR: u32 = 5793266;

/// Footer branding text.
pub const FOOTER_TEXT: &str = "OVH Status Watcher";

/// Footer branding icon.
pub const FOOTER_ICON_URL: &str = "https://www.ovh.com/manager/images/logo-ovh.svg";

/// Discord rejects embed titles longer than this.
const MAX_TITLE_CHARS: usize = 256;

/// Discord rejects embed descriptions longer than this.
const MAX_DESCRIPTION_CHARS: usize = 4096;

/// A webhook message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub content: String,
    pub tts: bool,
    pub embeds: Vec<Embed>,
}

/// A rich embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: EmbedFooter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

/// Embed footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}

/// Embed image attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

impl WebhookMessage {
    /// Render an incident title and HTML summary into a single-embed message.
    ///
    /// The first image in the summary becomes the embed image and is removed
    /// from the description.
    pub fn render(title: &str, summary_html: &str) -> Self {
        let image = extract_image(summary_html).map(|url| EmbedImage { url });
        let description = html_to_markdown(&strip_images(summary_html));

        Self {
            content: "Embed".to_string(),
            tts: false,
            embeds: vec![Embed {
                title: truncate_chars(title.trim(), MAX_TITLE_CHARS),
                description: truncate_chars(description.trim(), MAX_DESCRIPTION_CHARS),
                color: EMBED_COLOR,
                footer: EmbedFooter {
                    text: FOOTER_TEXT.to_string(),
                    icon_url: FOOTER_ICON_URL.to_string(),
                },
                image,
            }],
        }
    }

    /// Image URL of the first embed, if any.
    pub fn image_url(&self) -> Option<&str> {
        self.embeds
            .first()
            .and_then(|embed| embed.image.as_ref())
            .map(|image| image.url.as_str())
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}
