// Messages flash : une notice transitoire posée sur une redirection
// et consommée par la page suivante (cookie "flash", base64 de JSON).

use actix_web::{cookie::Cookie, http::header, HttpRequest, HttpResponse};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

const FLASH_COOKIE_NAME: &str = "flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: String,   // 'success', 'info', 'warning', 'danger'
    pub message: String,
}

impl Flash {
    fn new(level: &str, message: impl Into<String>) -> Self {
        Self { level: level.to_string(), message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("success", message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new("info", message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new("warning", message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new("danger", message)
    }

    fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Page renvoyée au rendu : la notice en attente + le view-model
#[derive(Serialize)]
pub struct Page<T: Serialize> {
    pub flash: Option<Flash>,
    #[serde(flatten)]
    pub view: T,
}

/// Lit la notice en attente dans la requête
pub fn read_flash(req: &HttpRequest) -> Option<Flash> {
    req.cookie(FLASH_COOKIE_NAME)
        .and_then(|cookie| Flash::decode(cookie.value()))
}

fn flash_cookie(flash: &Flash) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE_NAME, flash.encode())
        .path("/")
        .http_only(true)
        .finish()
}

fn flash_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE_NAME, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// 303 See Other vers `location`, avec une notice optionnelle
pub fn redirect(location: &str, flash: Option<Flash>) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location.to_string()));
    if let Some(flash) = flash {
        builder.cookie(flash_cookie(&flash));
    }
    builder.finish()
}

/// Rend une page (view-model JSON) et consomme la notice en attente
pub fn render<T: Serialize>(req: &HttpRequest, view: T) -> HttpResponse {
    let flash = read_flash(req);
    let mut builder = HttpResponse::Ok();
    if flash.is_some() {
        builder.cookie(flash_removal_cookie());
    }
    builder.json(Page { flash, view })
}

/// Réaffiche un formulaire invalide : 400 + erreurs par champ + notice éventuelle
pub fn render_invalid<T: Serialize>(view: T, flash: Option<Flash>) -> HttpResponse {
    HttpResponse::BadRequest().json(Page { flash, view })
}
