// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Farcaster Frame rendering.
//!
//! Frames are plain HTML documents whose `og:*` and `fc:frame*` meta tags
//! tell the client what image and buttons to show. Everything interpolated
//! into the document is HTML-escaped.

use std::fmt::Write as _;

use url::form_urlencoded::byte_serialize;

use crate::config::AppConfig;

/// Fallback used when neither configuration nor the request name a host.
pub const LOCAL_BASE_URL: &str = "http://localhost:3000";

pub const FRAME_VERSION: &str = "vNext";
pub const SITE_TITLE: &str = "Clenxi";
pub const OG_TITLE: &str = "Clenxi - Daily Claim & Referral";
pub const TAGLINE: &str = "Daily claim 1000 $CLENXI and get 5000 $CLENXI per friend referral!";
pub const OG_DESCRIPTION: &str =
    "Daily claim 1000 $CLENXI and get 5000 $CLENXI per friend referral! Community-driven Web3 project.";

/// Resolve the public base URL of the game, without trailing slash.
///
/// Order: `PUBLIC_BASE_URL`, `https://$VERCEL_URL`, `https://<Host>`, localhost.
pub fn resolve_base_url(config: &AppConfig, host: Option<&str>) -> String {
    if let Some(url) = &config.public_base_url {
        return url.clone();
    }
    if let Some(vercel) = &config.vercel_url {
        return format!("https://{vercel}");
    }
    match host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => format!("https://{host}"),
        None => LOCAL_BASE_URL.to_string(),
    }
}

/// `<base>?ref=<code>`.
pub fn referral_url(base: &str, code: &str) -> String {
    let encoded: String = byte_serialize(code.as_bytes()).collect();
    format!("{base}?ref={encoded}")
}

/// Frame image shown for every frame.
pub fn logo_url(base: &str) -> String {
    format!("{base}/logo.png")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Link,
    Post,
}

impl ButtonAction {
    fn as_str(self) -> &'static str {
        match self {
            ButtonAction::Link => "link",
            ButtonAction::Post => "post",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameButton {
    pub label: String,
    pub action: ButtonAction,
    pub target: String,
}

impl FrameButton {
    pub fn link(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Link,
            target: target.into(),
        }
    }

    pub fn post(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Post,
            target: target.into(),
        }
    }
}

/// A frame HTML document.
#[derive(Debug, Clone, Default)]
pub struct FrameDocument {
    pub title: Option<String>,
    pub og_title: String,
    pub og_description: String,
    pub image: String,
    pub buttons: Vec<FrameButton>,
    pub input_placeholder: Option<String>,
    pub post_url: Option<String>,
    /// Client-side redirect for browsers opening the document directly.
    pub redirect: Option<String>,
    /// Body paragraphs (plain text).
    pub paragraphs: Vec<String>,
    pub heading: Option<String>,
    /// Trailing link shown in the body.
    pub link: Option<(String, String)>,
}

impl FrameDocument {
    pub fn new(
        og_title: impl Into<String>,
        og_description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            og_title: og_title.into(),
            og_description: og_description.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn button(mut self, button: FrameButton) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn input(mut self, placeholder: impl Into<String>) -> Self {
        self.input_placeholder = Some(placeholder.into());
        self
    }

    pub fn post_url(mut self, url: impl Into<String>) -> Self {
        self.post_url = Some(url.into());
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect = Some(url.into());
        self
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    pub fn link(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.link = Some((label.into(), href.into()));
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<!DOCTYPE html>\n<html>\n  <head>\n");

        if let Some(title) = &self.title {
            let _ = writeln!(html, "    <title>{}</title>", escape_html(title));
        }
        meta(&mut html, "og:title", &self.og_title);
        meta(&mut html, "og:description", &self.og_description);
        meta(&mut html, "og:image", &self.image);

        meta(&mut html, "fc:frame", FRAME_VERSION);
        meta(&mut html, "fc:frame:image", &self.image);
        if let Some(placeholder) = &self.input_placeholder {
            meta(&mut html, "fc:frame:input:text", placeholder);
        }
        for (i, button) in self.buttons.iter().enumerate() {
            let n = i + 1;
            meta(&mut html, &format!("fc:frame:button:{n}"), &button.label);
            meta(&mut html, &format!("fc:frame:button:{n}:action"), button.action.as_str());
            meta(&mut html, &format!("fc:frame:button:{n}:target"), &button.target);
        }
        if let Some(post_url) = &self.post_url {
            meta(&mut html, "fc:frame:post_url", post_url);
        }

        html.push_str("  </head>\n  <body>\n");
        if let Some(target) = &self.redirect {
            // serde_json gives a correctly quoted JS string literal
            let literal = serde_json::to_string(target).unwrap_or_default().replace("</", "<\\/");
            let _ = writeln!(html, "    <script>\n      window.location.href = {literal};\n    </script>");
        }
        if let Some(heading) = &self.heading {
            let _ = writeln!(html, "    <h1>{}</h1>", escape_html(heading));
        }
        for paragraph in &self.paragraphs {
            let _ = writeln!(html, "    <p>{}</p>", escape_html(paragraph));
        }
        if let Some((label, href)) = &self.link {
            let _ = writeln!(
                html,
                "    <a href=\"{}\">{}</a>",
                escape_html(href),
                escape_html(label)
            );
        }
        html.push_str("  </body>\n</html>\n");
        html
    }
}

fn meta(html: &mut String, property: &str, content: &str) {
    let _ = writeln!(
        html,
        "    <meta property=\"{}\" content=\"{}\" />",
        escape_html(property),
        escape_html(content)
    );
}

// =============================================================================
// Frames
// =============================================================================

/// Landing frame with a single "Play" link button.
pub fn landing_frame(base: &str, referral: Option<&str>) -> FrameDocument {
    let target = match referral {
        Some(code) => referral_url(base, code),
        None => base.to_string(),
    };
    FrameDocument::new(OG_TITLE, OG_DESCRIPTION, logo_url(base))
        .title(SITE_TITLE)
        .button(FrameButton::link("🎮 Play Clenxi", target.clone()))
        .post_url(format!("{base}/api/frame"))
        .heading(SITE_TITLE)
        .paragraph(TAGLINE)
        .paragraph("Community-driven Web3 project by @clenix.eth")
        .link("Play Now", target)
}

/// Response to a frame button press: send the viewer into the game.
pub fn redirect_frame(base: &str, target: &str) -> FrameDocument {
    FrameDocument::new(OG_TITLE, OG_DESCRIPTION, logo_url(base))
        .title(SITE_TITLE)
        .button(FrameButton::link("🎮 Play Now & Get 5000 $CLENXI", target))
        .redirect(target)
        .heading("Redirecting to Clenxi Game...")
        .link("click here", target)
}

/// Frame with a single "Back to Game" button.
pub fn result_frame(base: &str, og_title: &str, og_description: &str) -> FrameDocument {
    FrameDocument::new(og_title, og_description, logo_url(base))
        .button(FrameButton::link("🎮 Back to Game", base))
}
