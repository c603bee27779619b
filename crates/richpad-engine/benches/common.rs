// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markup(sections: usize) -> String {
    let base = "<h2>Section</h2><p>Paragraph with <strong>bold</strong> and <em>italic</em> text.</p>\
<ul><li>First item<ul><li>Nested item</li></ul></li><li>Second item</li></ul>\
<pre><code>fn example() {}</code></pre><blockquote>A quote</blockquote><hr>";
    base.repeat(sections)
}

#[allow(dead_code)]
pub fn generate_long_paragraph(words: usize) -> String {
    let text = "lorem ipsum ".repeat(words);
    format!("<p>{}</p>", text.trim_end())
}
