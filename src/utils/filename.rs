// Noms de fichiers d'images produit

use unicode_normalization::UnicodeNormalization;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Vérifie que l'extension du fichier est autorisée (insensible à la casse)
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Nettoie un nom de fichier fourni par le client (règles de secure_filename de Werkzeug)
/// - décomposition NFKD puis abandon du non ASCII ("bägue" -> "bague")
/// - séparateurs de chemin remplacés par des espaces
/// - seuls [A-Za-z0-9_.-] sont conservés, les espaces deviennent '_'
/// - '.' et '_' retirés en début/fin
pub fn secure_filename(filename: &str) -> String {
    let replaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
