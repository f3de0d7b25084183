#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    docx_pdf_mcp_server::run().await
}
