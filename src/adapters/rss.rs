use crate::domain::model::Article;
use crate::utils::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    Published,
    Source,
}

/// Pulls up to `limit` `<item>` entries out of an RSS 2.0 document.
pub fn parse_items(xml: &str, limit: usize) -> Result<Vec<Article>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<Article> = None;
    let mut field: Option<Field> = None;

    while items.len() < limit {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => current = Some(Article::default()),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"link" if current.is_some() => field = Some(Field::Link),
                b"pubDate" if current.is_some() => field = Some(Field::Published),
                b"source" if current.is_some() => field = Some(Field::Source),
                _ => field = None,
            },
            Event::Text(t) => {
                if let (Some(article), Some(f)) = (current.as_mut(), field) {
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(&t).into_owned(),
                    };
                    append(article, f, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(article), Some(f)) = (current.as_mut(), field) {
                    append(article, f, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(article) = current.take() {
                        items.push(article);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

fn append(article: &mut Article, field: Field, text: &str) {
    let target = match field {
        Field::Title => &mut article.title,
        Field::Link => &mut article.link,
        Field::Published => &mut article.published,
        Field::Source => &mut article.source,
    };
    target.push_str(text);
}
