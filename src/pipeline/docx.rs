//! WordprocessingML serialisation of an assembled [`Document`].
//!
//! A .docx file is a zip package of XML parts. Only the parts Word needs to
//! open the file are written: content types, package relationships, the main
//! document, its relationships and a style sheet defining `Heading1`.

use crate::error::Pdf2DocxError;
use crate::pipeline::assemble::{Block, Document, Inline};
use quick_xml::escape::escape;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// MIME type of the generated package.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Serialise `doc` into an in-memory .docx package.
pub fn to_bytes(doc: &Document) -> Result<Vec<u8>, Pdf2DocxError> {
    let cursor = write_docx(doc, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Serialise `doc` as a .docx package into `writer`, returning the writer.
pub fn write_docx<W: Write + Seek>(doc: &Document, writer: W) -> Result<W, Pdf2DocxError> {
    let mut zip = ZipWriter::new(writer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", with_decl(CONTENT_TYPES)),
        ("_rels/.rels", with_decl(PACKAGE_RELS)),
        ("word/_rels/document.xml.rels", with_decl(DOCUMENT_RELS)),
        ("word/styles.xml", styles_xml(doc)),
        ("word/document.xml", document_xml(doc)),
    ];

    for (name, content) in parts {
        zip.start_file(name, options)
            .map_err(|e| Pdf2DocxError::DocumentPackage(format!("{}: {}", name, e)))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| Pdf2DocxError::DocumentPackage(format!("{}: {}", name, e)))?;
    }

    zip.finish()
        .map_err(|e| Pdf2DocxError::DocumentPackage(format!("finalise: {}", e)))
}

fn with_decl(body: &str) -> String {
    format!("{}{}", XML_DECL, body)
}

fn styles_xml(doc: &Document) -> String {
    let style = doc.heading_style;
    let bold = if style.bold { "<w:b/>" } else { "" };
    format!(
        concat!(
            r#"{decl}<w:styles xmlns:w="{ns}">"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:jc w:val="left"/><w:outlineLvl w:val="0"/></w:pPr>"#,
            r#"<w:rPr>{bold}<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#,
            r#"</w:styles>"#
        ),
        decl = XML_DECL,
        ns = W_NS,
        bold = bold,
        size = style.size_half_points,
    )
}

fn document_xml(doc: &Document) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:document xmlns:w="{}"><w:body>"#, W_NS));

    for block in &doc.blocks {
        match block {
            Block::Heading(text) => {
                xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="left"/></w:pPr>"#);
                push_run(&mut xml, text, false);
                xml.push_str("</w:p>");
            }
            Block::Paragraph(inlines) => {
                xml.push_str("<w:p>");
                for inline in inlines {
                    match inline {
                        Inline::Run(run) => push_run(&mut xml, &run.content, run.bold),
                        Inline::LineBreak => xml.push_str("<w:r><w:br/></w:r>"),
                    }
                }
                xml.push_str("</w:p>");
            }
        }
    }

    xml.push_str("<w:sectPr/></w:body></w:document>");
    xml
}

fn push_run(xml: &mut String, text: &str, bold: bool) {
    xml.push_str("<w:r>");
    if bold {
        xml.push_str("<w:rPr><w:b/></w:rPr>");
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&escape(xml_safe(text).as_str()));
    xml.push_str("</w:t></w:r>");
}

/// Drop characters XML 1.0 cannot carry (PDF text often has stray control codes).
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
