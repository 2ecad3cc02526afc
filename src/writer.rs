//! 区切り文字形式での書き込み

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 区切り文字形式の書き込み設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSetting {
    pub field_separator: String,
    pub record_separator: String,
    /// 引用符
    pub quote: char,
    /// ファイル先頭に UTF-8 BOM を書くか
    pub byte_order_mark: bool,
}

impl Default for WriterSetting {
    fn default() -> Self {
        Self {
            field_separator: ",".into(),
            record_separator: "\r\n".into(),
            quote: '"',
            byte_order_mark: false,
        }
    }
}

impl WriterSetting {
    pub fn csv() -> Self {
        Self::default()
    }

    pub fn tsv() -> Self {
        Self {
            field_separator: "\t".into(),
            ..Self::default()
        }
    }

    pub fn ssv() -> Self {
        Self {
            field_separator: " ".into(),
            ..Self::default()
        }
    }

    pub fn with_byte_order_mark(mut self, enabled: bool) -> Self {
        self.byte_order_mark = enabled;
        self
    }
}

pub struct DelimitedWriter<W: Write> {
    inner: W,
    setting: WriterSetting,
}

impl DelimitedWriter<BufWriter<File>> {
    /// ファイルを新規作成（既存なら上書き）して書き込み機能を生成する
    pub fn create(path: impl AsRef<Path>, setting: WriterSetting) -> io::Result<Self> {
        let mut inner = BufWriter::new(File::create(path.as_ref())?);
        if setting.byte_order_mark {
            inner.write_all(UTF8_BOM)?;
        }
        Ok(Self::new(inner, setting))
    }
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(inner: W, setting: WriterSetting) -> Self {
        Self { inner, setting }
    }

    pub fn setting(&self) -> &WriterSetting {
        &self.setting
    }

    /// 1行分のデータを書き込む
    pub fn write_row<I, T>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.write_row_with(fields, false)
    }

    /// `quote_always` が真なら全フィールドを引用符で括る
    pub fn write_row_with<I, T>(&mut self, fields: I, quote_always: bool) -> io::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut record = String::new();
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                record.push_str(&self.setting.field_separator);
            }
            record.push_str(&self.format_field(field.as_ref(), quote_always));
        }
        record.push_str(&self.setting.record_separator);
        self.inner.write_all(record.as_bytes())
    }

    /// 終端記号のみ書き込む
    pub fn write_empty_row(&mut self) -> io::Result<()> {
        self.inner.write_all(self.setting.record_separator.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// フラッシュして書き込み先を返す
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn format_field<'f>(&self, text: &'f str, quote_always: bool) -> Cow<'f, str> {
        if !quote_always && !self.needs_quote(text) {
            return Cow::Borrowed(text);
        }

        let quote = self.setting.quote;
        let mut escaped = String::with_capacity(text.len() + 2);
        escaped.push(quote);
        for c in text.chars() {
            if c == quote {
                escaped.push(quote);
            }
            escaped.push(c);
        }
        escaped.push(quote);
        Cow::Owned(escaped)
    }

    fn needs_quote(&self, text: &str) -> bool {
        text.contains('\r')
            || text.contains('\n')
            || text.contains(self.setting.quote)
            || text.contains(self.setting.field_separator.as_str())
            || text.starts_with(['\t', ' '])
            || text.ends_with(['\t', ' '])
    }
}

/// 全行をファイルに書き込む
///
/// 書き込みの成否にかかわらず、戻る時点でファイルは閉じられている。
pub fn write_file<R, I, T>(path: impl AsRef<Path>, setting: WriterSetting, rows: R) -> io::Result<()>
where
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let path = path.as_ref();
    let mut writer = DelimitedWriter::create(path, setting)?;
    let mut count = 0usize;
    for row in rows {
        writer.write_row(row)?;
        count += 1;
    }
    writer.finish()?;
    debug!("{}行を書き込み: {:?}", count, path);
    Ok(())
}
