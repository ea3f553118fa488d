//! Minimal WordprocessingML document builder
//!
//! Renderers describe a document as a list of [`Block`]s; the builder turns
//! them into `word/document.xml` and packs the Office Open XML parts into a
//! zip container.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::DocxConfig;
use crate::error::EngineError;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A span of text with uniform formatting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub size_pt: Option<u32>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn size(mut self, pt: u32) -> Self {
        self.size_pt = Some(pt);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// One structural write against the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        runs: Vec<Run>,
        align: Alignment,
        space_after_pt: Option<u32>,
    },
    Bullet(String),
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    /// Plain left-aligned paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::runs(vec![Run::new(text)])
    }

    pub fn runs(runs: Vec<Run>) -> Self {
        Self::Paragraph {
            runs,
            align: Alignment::Left,
            space_after_pt: None,
        }
    }

    /// Empty paragraph used as vertical space
    pub fn spacer() -> Self {
        Self::runs(Vec::new())
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::Bullet(text.into())
    }

    pub fn centered(self) -> Self {
        match self {
            Self::Paragraph {
                runs,
                space_after_pt,
                ..
            } => Self::Paragraph {
                runs,
                align: Alignment::Center,
                space_after_pt,
            },
            other => other,
        }
    }

    pub fn space_after(self, pt: u32) -> Self {
        match self {
            Self::Paragraph { runs, align, .. } => Self::Paragraph {
                runs,
                align,
                space_after_pt: Some(pt),
            },
            other => other,
        }
    }

    /// Visible text of the block
    pub fn text(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::Bullet(text) => text.clone(),
            Self::Paragraph { runs, .. } => runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

/// Accumulates blocks and writes a `.docx` package
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    font: String,
    font_size_pt: u32,
    blocks: Vec<Block>,
}

impl DocumentBuilder {
    pub fn new(config: &DocxConfig) -> Self {
        Self {
            font: config.font.clone(),
            font_size_pt: config.font_size_pt,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.extend(blocks);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Serialize the body as `word/document.xml`
    pub fn document_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(r#"<w:document xmlns:w="{WORD_NS}"><w:body>"#));
        for block in &self.blocks {
            write_block(&mut xml, block);
        }
        xml.push_str(
            r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1080" w:right="1080" w:bottom="1080" w:left="1080" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
        );
        xml.push_str("</w:body></w:document>");
        xml
    }

    fn styles_xml(&self) -> String {
        let font = xml_escape(&self.font);
        let size = self.font_size_pt * 2;
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{WORD_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/><w:sz w:val="{size}"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="60"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="160" w:after="40"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:style></w:styles>"#
        )
    }

    /// Write the package to `path`
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        self.write_package(path)
            .map_err(|e| EngineError::io(path, e))
    }

    fn write_package(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let styles = self.styles_xml();
        let document = self.document_xml();
        let parts: [(&str, &str); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/styles.xml", styles.as_str()),
            ("word/numbering.xml", NUMBERING),
            ("word/document.xml", document.as_str()),
        ];
        for (name, body) in parts {
            zip.start_file(name, options).map_err(io::Error::other)?;
            zip.write_all(body.as_bytes())?;
        }
        zip.finish().map_err(io::Error::other)?;
        Ok(())
    }
}

fn write_block(xml: &mut String, block: &Block) {
    match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 2);
            xml.push_str(&format!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>"#
            ));
            write_run(xml, &Run::new(text.as_str()));
            xml.push_str("</w:p>");
        }
        Block::Paragraph {
            runs,
            align,
            space_after_pt,
        } => {
            xml.push_str("<w:p>");
            if *align != Alignment::Left || space_after_pt.is_some() {
                xml.push_str("<w:pPr>");
                if let Some(pt) = space_after_pt {
                    xml.push_str(&format!(r#"<w:spacing w:after="{}"/>"#, pt * 20));
                }
                if *align == Alignment::Center {
                    xml.push_str(r#"<w:jc w:val="center"/>"#);
                }
                xml.push_str("</w:pPr>");
            }
            for run in runs {
                write_run(xml, run);
            }
            xml.push_str("</w:p>");
        }
        Block::Bullet(text) => {
            xml.push_str(
                r#"<w:p><w:pPr><w:pStyle w:val="ListBullet"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr>"#,
            );
            write_run(xml, &Run::new(text.as_str()));
            xml.push_str("</w:p>");
        }
    }
}

fn write_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    if run.bold || run.italic || run.size_pt.is_some() {
        xml.push_str("<w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        if let Some(pt) = run.size_pt {
            xml.push_str(&format!(r#"<w:sz w:val="{}"/>"#, pt * 2));
        }
        xml.push_str("</w:rPr>");
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&xml_escape(&run.text));
    xml.push_str("</w:t></w:r>");
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(&DocxConfig {
            font: "Calibri".to_string(),
            font_size_pt: 11,
        })
    }

    #[test]
    fn test_document_xml_escapes_text() {
        let mut doc = builder();
        doc.push(Block::heading(1, "R&D <Lab>"));
        doc.push(Block::bullet("50% \"faster\""));
        let xml = doc.document_xml();
        assert!(xml.contains("R&amp;D &lt;Lab&gt;"));
        assert!(xml.contains("50% &quot;faster&quot;"));
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="ListBullet"/>"#));
    }

    #[test]
    fn test_run_formatting() {
        let mut doc = builder();
        doc.push(Block::runs(vec![Run::new("Name").bold().size(24)]).centered().space_after(18));
        let xml = doc.document_xml();
        assert!(xml.contains(r#"<w:rPr><w:b/><w:sz w:val="48"/></w:rPr>"#));
        assert!(xml.contains(r#"<w:spacing w:after="360"/><w:jc w:val="center"/>"#));
    }

    #[test]
    fn test_block_text() {
        let block = Block::runs(vec![Run::new("Engineer"), Run::new(" | Remote").italic()]);
        assert_eq!(block.text(), "Engineer | Remote");
    }

    #[test]
    fn test_save_writes_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let mut doc = builder();
        doc.push(Block::paragraph("Hello"));
        doc.save(&path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/numbering.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }
        let mut body = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert!(body.contains("Hello"));
    }

    #[test]
    fn test_save_to_missing_directory_is_io_error() {
        let err = builder()
            .save(Path::new("/nonexistent/dir/out.docx"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
