//! HTML标签提取器
//! 负责从HTML中提取script-src和meta标签

use std::cell::RefCell;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use markup5ever::interface::Attribute;
use tendril::StrTendril;

/// 提取结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HtmlTags {
    /// `<script src>` 列表（按出现顺序）
    pub script_srcs: Vec<String>,
    /// `<meta name|property content>`，名称小写
    pub meta_tags: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct TagSink {
    tags: RefCell<HtmlTags>,
}

impl TokenSink for TagSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            match name.as_ref() {
                "script" => self.extract_script_src(&attrs),
                "meta" => self.extract_meta_tag(&attrs),
                _ => {}
            }
        }
        TokenSinkResult::Continue
    }
}

impl TagSink {
    fn extract_script_src(&self, attrs: &[Attribute]) {
        if let Some(attr) = attrs.iter().find(|a| a.name.local.as_ref() == "src") {
            self.tags.borrow_mut().script_srcs.push(attr.value.to_string());
        }
    }

    fn extract_meta_tag(&self, attrs: &[Attribute]) {
        let mut name = None;
        let mut content = None;

        for attr in attrs {
            match attr.name.local.as_ref() {
                "name" | "property" if name.is_none() => name = Some(attr.value.to_lowercase()),
                "content" => content = Some(attr.value.to_string()),
                _ => {}
            }
        }

        if let (Some(n), Some(c)) = (name, content) {
            self.tags.borrow_mut().meta_tags.push((n, c));
        }
    }
}

/// HTML标签提取器
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// 从HTML字符串提取标签
    pub fn extract(html: &str) -> HtmlTags {
        let tokenizer = Tokenizer::new(TagSink::default(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.tags.into_inner()
    }
}
