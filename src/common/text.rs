// src/common/text.rs

/// Escapa `<` e `>` (mitigação mínima de XSS) e remove espaços das pontas.
/// Não é uma sanitização de HTML completa.
pub fn escape_angle_brackets(input: &str) -> String {
    input.replace('<', "&lt;").replace('>', "&gt;").trim().to_string()
}

/// Escapa os caracteres especiais de HTML para interpolação em templates de e-mail.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Prévia de até `max_chars` caracteres, com reticências quando cortada.
pub fn preview(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &input[..cut]),
        None => input.to_string(),
    }
}
