// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use std::path::Path;

use crate::{common::error::AppError, models::agreement::AgreementDocument};

const FONT_FAMILY: &str = "Roboto";

fn rupees(amount: Decimal) -> String {
    format!("₹{}", amount.round_dp(2).normalize())
}

fn render_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

/// Desenha o contrato de aluguel. Síncrono (CPU): chame dentro de `spawn_blocking`.
pub fn render_agreement_pdf(fonts_dir: &Path, data: &AgreementDocument) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta configurada
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|_| {
        AppError::FontNotFound(format!("Fonte {} não encontrada em {}", FONT_FAMILY, fonts_dir.display()))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Rent Agreement {}", data.agreement_id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    let heading = style::Style::new().bold().with_font_size(14);

    // --- TÍTULO ---
    let mut title = elements::Paragraph::new("RENT AGREEMENT");
    title.set_alignment(genpdf::Alignment::Center);
    doc.push(title.styled(style::Style::new().bold().with_font_size(20)));
    doc.push(elements::Break::new(1.5));
    doc.push(elements::Paragraph::new(format!("Date: {}", data.issued_on.format("%d/%m/%Y"))));
    doc.push(elements::Break::new(1.5));

    // --- PARTES ---
    doc.push(elements::Paragraph::new("BETWEEN:").styled(heading));
    doc.push(elements::Paragraph::new(format!("Landlord: {}", data.landlord_name)));
    doc.push(elements::Paragraph::new(format!("Tenant: {}", data.tenant_name)));
    doc.push(elements::Break::new(1.5));

    // --- IMÓVEL ---
    doc.push(elements::Paragraph::new("PROPERTY DETAILS:").styled(heading));
    doc.push(elements::Paragraph::new(format!("Address: {}, {}", data.address, data.city)));
    doc.push(elements::Paragraph::new(format!("Property Type: {}", data.property_type)));
    doc.push(elements::Paragraph::new(format!(
        "Bedrooms: {} | Bathrooms: {}",
        data.bedrooms, data.bathrooms
    )));
    doc.push(elements::Break::new(1.5));

    // --- VALORES ---
    doc.push(elements::Paragraph::new("RENT DETAILS:").styled(heading));
    doc.push(elements::Paragraph::new(format!("Monthly Rent: {}", rupees(data.monthly_rent))));
    doc.push(elements::Paragraph::new(format!("Security Deposit: {}", rupees(data.security_deposit))));
    doc.push(elements::Paragraph::new(format!(
        "Lease Period: {} to {}",
        data.start_date, data.end_date
    )));
    doc.push(elements::Break::new(1.5));

    // --- TERMOS ---
    if let Some(terms) = data.terms.as_deref().filter(|t| !t.trim().is_empty()) {
        doc.push(elements::Paragraph::new("TERMS AND CONDITIONS:").styled(heading));
        for line in terms.lines() {
            doc.push(elements::Paragraph::new(line).styled(style::Style::new().with_font_size(10)));
        }
        doc.push(elements::Break::new(1.5));
    }

    // --- ASSINATURAS ---
    let mut signatures = elements::TableLayout::new(vec![1, 1]);
    signatures
        .row()
        .element(elements::Paragraph::new("Landlord Signature: ___________________"))
        .element(elements::Paragraph::new("Tenant Signature: ___________________"))
        .push()
        .map_err(render_error)?;
    signatures
        .row()
        .element(elements::Paragraph::new("Date: _______________"))
        .element(elements::Paragraph::new("Date: _______________"))
        .push()
        .map_err(render_error)?;
    doc.push(signatures);
    doc.push(elements::Break::new(2));

    // --- QR CODE DE VERIFICAÇÃO ---
    let code = QrCode::new(data.verification_url.as_bytes()).map_err(render_error)?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

    let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
        .map_err(render_error)?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(pdf_image);
    doc.push(
        elements::Paragraph::new(format!("Verify: {}", data.verification_url))
            .styled(style::Style::new().italic().with_font_size(8)),
    );

    // Renderiza para buffer (memória)
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(render_error)?;

    Ok(buffer)
}
