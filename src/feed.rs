use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use url::Url;

use crate::error::FeedError;
use crate::models::MessageUnit;

/// One page of the feed: its messages in document order and a link further back in time.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub messages: Vec<MessageUnit>,
    pub older: Option<String>,
}

pub trait FeedSource {
    fn fetch_page(&mut self, url: &str) -> Result<Page, FeedError>;
}

pub struct HttpFeed {
    client: Client,
}

impl HttpFeed {
    pub fn new() -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(default_user_agent())
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FeedError::Client)?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeed {
    fn fetch_page(&mut self, url: &str) -> Result<Page, FeedError> {
        let request_error = |source: reqwest::Error| FeedError::Request {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().map_err(request_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
            });
        }

        let html = resp.text().map_err(request_error)?;
        parse_page(&html, url)
    }
}

fn default_user_agent() -> String {
    format!("gighunt/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS)
}

// Telegram's public channel preview (t.me/s/<channel>)
struct PageSelectors {
    message: Selector,
    text: Selector,
    time: Selector,
    anchor: Selector,
    emphasis: Selector,
    older: Selector,
}

impl PageSelectors {
    fn new() -> Result<Self, FeedError> {
        Ok(Self {
            message: selector(".tgme_widget_message")?,
            text: selector(".tgme_widget_message_text")?,
            time: selector("time[datetime]")?,
            anchor: selector("a[href]")?,
            emphasis: selector("i, em")?,
            older: selector("link[rel='prev']")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, FeedError> {
    Selector::parse(css).map_err(|e| FeedError::Selector(format!("{css}: {e}")))
}

/// Parse one feed page. `base_url` resolves the relative older-page link.
pub fn parse_page(html: &str, base_url: &str) -> Result<Page, FeedError> {
    let selectors = PageSelectors::new()?;
    let document = Html::parse_document(html);

    let messages = document
        .select(&selectors.message)
        .map(|el| parse_message(el, &selectors))
        .collect();

    let older = match document
        .select(&selectors.older)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
    {
        Some(href) => Some(resolve(base_url, href)?),
        None => None,
    };

    Ok(Page { messages, older })
}

fn parse_message(element: ElementRef, selectors: &PageSelectors) -> MessageUnit {
    let datetime = element
        .select(&selectors.time)
        .filter_map(|t| t.value().attr("datetime"))
        .next()
        .map(str::to_string);

    let Some(body) = element.select(&selectors.text).next() else {
        return MessageUnit {
            datetime,
            ..MessageUnit::default()
        };
    };

    let links = body
        .select(&selectors.anchor)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    let emphasized = body
        .select(&selectors.emphasis)
        .map(|el| el.text().collect::<String>())
        .collect();

    MessageUnit {
        text: render_text(body).trim().to_string(),
        datetime,
        links,
        emphasized,
    }
}

/// Text content with `<br>` turned back into line breaks.
fn render_text(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn resolve(base_url: &str, href: &str) -> Result<String, FeedError> {
    let base = Url::parse(base_url).map_err(|source| FeedError::Url {
        url: base_url.to_string(),
        source,
    })?;
    let joined = base.join(href).map_err(|source| FeedError::Url {
        url: href.to_string(),
        source,
    })?;
    Ok(joined.to_string())
}
