use crate::error::WriteError;
use crate::results::PageRecord;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Encode records as `<pages><page>…</page></pages>`
pub fn render(records: &[PageRecord]) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("pages")))?;
    for page in records {
        write(&mut writer, Event::Start(BytesStart::new("page")))?;
        text_element(&mut writer, "url", &page.url)?;
        text_element(&mut writer, "title", &page.title)?;
        text_element(&mut writer, "meta_description", &page.meta_description)?;
        text_element(&mut writer, "content", &page.content)?;
        write(&mut writer, Event::End(BytesEnd::new("page")))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("pages")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), WriteError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), WriteError> {
    writer
        .write_event(event)
        .map_err(|e| WriteError::Xml(e.to_string()))
}
