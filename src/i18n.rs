//! Static UI string tables.
//!
//! Turkish is the base table: a key missing from the selected language falls back to
//! Turkish, then English, then to the key itself.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LanguageOption {
    pub name: &'static str,
    pub code: &'static str,
}

pub const LANGUAGES: &[LanguageOption] = &[
    LanguageOption { name: "Türkçe", code: "tr" },
    LanguageOption { name: "English", code: "en" },
    LanguageOption { name: "Deutsch", code: "de" },
    LanguageOption { name: "Español", code: "es" },
    LanguageOption { name: "Français", code: "fr" },
    LanguageOption { name: "Italiano", code: "it" },
    LanguageOption { name: "日本語", code: "ja" },
    LanguageOption { name: "中文", code: "zh" },
    LanguageOption { name: "Русский", code: "ru" },
];

pub const DEFAULT_LANG: &str = "en";

/// Reduces a locale such as `de_DE.UTF-8` or `pt-BR` to its two-letter language code.
pub fn norm_lang(code: &str) -> String {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        return DEFAULT_LANG.to_string();
    }
    let base = code.split('_').next().unwrap_or("");
    let base = base.split('-').next().unwrap_or("");
    base.chars().take(2).collect()
}

pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|l| l.code == code)
}

/// Picks the UI language for a raw system locale, `en` when unsupported or unknown.
pub fn detect_lang_code(raw_locale: Option<&str>) -> String {
    let code = norm_lang(raw_locale.unwrap_or(""));
    if is_supported(&code) {
        code
    } else {
        DEFAULT_LANG.to_string()
    }
}

/// System locale as reported by the OS, falling back to the usual POSIX variables.
pub fn system_locale() -> Option<String> {
    tauri_plugin_os::locale().or_else(|| {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty() && v != "C" && v != "POSIX")
    })
}

fn table(code: &str) -> Option<&'static [(&'static str, &'static str)]> {
    let table = match code {
        "tr" => TR,
        "en" => EN,
        "de" => DE,
        "es" => ES,
        "fr" => FR,
        "it" => IT,
        "ja" => JA,
        "zh" => ZH,
        "ru" => RU,
        _ => return None,
    };
    Some(table)
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn raw(lang: &str, key: &str) -> String {
    let lang = norm_lang(lang);
    table(&lang)
        .and_then(|t| lookup(t, key))
        .or_else(|| lookup(TR, key))
        .or_else(|| lookup(EN, key))
        .unwrap_or(key)
        .to_string()
}

/// Looks up `key` and fills `{name}` placeholders from `args`.
///
/// Placeholders without a matching argument are left untouched.
pub fn tr(lang: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut text = raw(lang, key);
    for (name, value) in args {
        text = text.replace(&format!("{{{}}}", name), value);
    }
    text
}

/// Every known key resolved for `lang`, with placeholders left in place.
pub fn translations(lang: &str) -> BTreeMap<&'static str, String> {
    TR.iter().map(|(key, _)| (*key, raw(lang, key))).collect()
}

// ============================================================================
// Tables
// ============================================================================

const TR: &[(&str, &str)] = &[
    ("title_error", "Hata"),
    ("title_warn", "Uyarı"),
    ("title_ok", "Tamam"),
    ("title_deps", "Gereksinimler"),
    ("ready", "Hazır"),
    ("analyzing", "Analiz ediliyor..."),
    ("found", "{n} video bulundu"),
    ("downloading", "İndiriliyor…"),
    ("stopping", "Durduruluyor..."),
    ("converting", "Dönüştürülüyor..."),
    ("btn_start", "İndirmeye Başla"),
    ("btn_stop", "Durdur"),
    ("no_url", "Lütfen bir URL girin!"),
    ("select_one", "Lütfen en az bir video seçin!"),
    ("select_folder", "Lütfen indirme klasörü seçin!"),
    ("ffmpeg_missing", "FFmpeg bulunamadı."),
    ("ytdlp_missing", "yt-dlp bulunamadı."),
    ("install_hint", "Kurulum komutu:\n{cmd}"),
    ("install_now", "Şimdi kur/indir"),
    ("later", "Sonra"),
    ("done", "İndirme tamamlandı."),
    ("dl_error", "İndirme hatası:\n{msg}"),
    ("an_error", "Bağlantı analiz edilemedi:\n{msg}"),
    ("format_lbl", "Format:"),
    ("quality_lbl", "Kalite:"),
    ("audio_quality_lbl", "Ses Kalitesi:"),
    ("playlist_lbl", "Playlist / Videolar"),
    ("select_all", "Hepsini Seç"),
    ("check_btn", "Kontrol"),
    ("folder_btn", "Klasör Seç"),
    ("open_folder", "Klasörü Aç"),
    ("lang_lbl", "Dil:"),
    ("url_ph", "YouTube, Instagram, TikTok, X/Twitter vb. bağlantı yapıştır..."),
    ("search_ph", "Listede ara..."),
    ("folder_lbl", "Klasör: {path}"),
];

const EN: &[(&str, &str)] = &[
    ("title_error", "Error"),
    ("title_warn", "Warning"),
    ("title_ok", "OK"),
    ("title_deps", "Requirements"),
    ("ready", "Ready"),
    ("analyzing", "Analyzing..."),
    ("found", "Found {n} videos"),
    ("downloading", "Downloading…"),
    ("stopping", "Stopping..."),
    ("converting", "Converting..."),
    ("btn_start", "Start Download"),
    ("btn_stop", "Stop"),
    ("no_url", "Please enter a URL!"),
    ("select_one", "Select at least one video!"),
    ("select_folder", "Please select a download folder!"),
    ("ffmpeg_missing", "FFmpeg not found."),
    ("ytdlp_missing", "yt-dlp not found."),
    ("install_hint", "Install command:\n{cmd}"),
    ("install_now", "Install/Download now"),
    ("later", "Later"),
    ("done", "Download finished."),
    ("dl_error", "Download error:\n{msg}"),
    ("an_error", "Could not analyze link:\n{msg}"),
    ("format_lbl", "Format:"),
    ("quality_lbl", "Quality:"),
    ("audio_quality_lbl", "Audio Quality:"),
    ("playlist_lbl", "Playlist / Videos"),
    ("select_all", "Select All"),
    ("check_btn", "Check"),
    ("folder_btn", "Choose Folder"),
    ("open_folder", "Open Folder"),
    ("lang_lbl", "Language:"),
    ("url_ph", "Paste a link (YouTube, Instagram, TikTok, X/Twitter etc.)..."),
    ("search_ph", "Search in list..."),
    ("folder_lbl", "Folder: {path}"),
];

const DE: &[(&str, &str)] = &[
    ("title_error", "Fehler"),
    ("title_warn", "Warnung"),
    ("title_ok", "OK"),
    ("title_deps", "Voraussetzungen"),
    ("ready", "Bereit"),
    ("analyzing", "Analysiere..."),
    ("found", "{n} Videos gefunden"),
    ("downloading", "Wird heruntergeladen…"),
    ("stopping", "Wird angehalten..."),
    ("converting", "Wird konvertiert..."),
    ("btn_start", "Download starten"),
    ("btn_stop", "Stopp"),
    ("no_url", "Bitte eine URL eingeben!"),
    ("select_one", "Bitte mindestens ein Video auswählen!"),
    ("select_folder", "Bitte einen Download-Ordner wählen!"),
    ("ffmpeg_missing", "FFmpeg nicht gefunden."),
    ("ytdlp_missing", "yt-dlp nicht gefunden."),
    ("install_hint", "Installationsbefehl:\n{cmd}"),
    ("install_now", "Jetzt installieren"),
    ("later", "Später"),
    ("done", "Download abgeschlossen."),
    ("dl_error", "Download-Fehler:\n{msg}"),
    ("an_error", "Link konnte nicht analysiert werden:\n{msg}"),
    ("format_lbl", "Format:"),
    ("quality_lbl", "Qualität:"),
    ("audio_quality_lbl", "Audioqualität:"),
    ("playlist_lbl", "Playlist / Videos"),
    ("select_all", "Alle auswählen"),
    ("check_btn", "Prüfen"),
    ("folder_btn", "Ordner wählen"),
    ("open_folder", "Ordner öffnen"),
    ("lang_lbl", "Sprache:"),
    ("url_ph", "Link einfügen (YouTube, Instagram, TikTok, X usw.)..."),
    ("search_ph", "In Liste suchen..."),
    ("folder_lbl", "Ordner: {path}"),
];

const ES: &[(&str, &str)] = &[
    ("title_error", "Error"),
    ("title_warn", "Aviso"),
    ("title_ok", "OK"),
    ("title_deps", "Requisitos"),
    ("ready", "Listo"),
    ("analyzing", "Analizando..."),
    ("found", "Se encontraron {n} vídeos"),
    ("downloading", "Descargando…"),
    ("stopping", "Deteniendo..."),
    ("converting", "Convirtiendo..."),
    ("btn_start", "Iniciar descarga"),
    ("btn_stop", "Detener"),
    ("no_url", "¡Introduce una URL!"),
    ("select_one", "¡Selecciona al menos un vídeo!"),
    ("select_folder", "¡Selecciona una carpeta de descarga!"),
    ("ffmpeg_missing", "No se encontró FFmpeg."),
    ("ytdlp_missing", "No se encontró yt-dlp."),
    ("install_hint", "Comando de instalación:\n{cmd}"),
    ("install_now", "Instalar/descargar ahora"),
    ("later", "Más tarde"),
    ("done", "Descarga finalizada."),
    ("dl_error", "Error de descarga:\n{msg}"),
    ("an_error", "No se pudo analizar el enlace:\n{msg}"),
    ("format_lbl", "Formato:"),
    ("quality_lbl", "Calidad:"),
    ("audio_quality_lbl", "Calidad de audio:"),
    ("playlist_lbl", "Lista / Vídeos"),
    ("select_all", "Seleccionar todo"),
    ("check_btn", "Comprobar"),
    ("folder_btn", "Elegir carpeta"),
    ("open_folder", "Abrir carpeta"),
    ("lang_lbl", "Idioma:"),
    ("url_ph", "Pega un enlace (YouTube, Instagram, TikTok, X, etc.)..."),
    ("search_ph", "Buscar en la lista..."),
    ("folder_lbl", "Carpeta: {path}"),
];

const FR: &[(&str, &str)] = &[
    ("title_error", "Erreur"),
    ("title_warn", "Avertissement"),
    ("title_ok", "OK"),
    ("title_deps", "Prérequis"),
    ("ready", "Prêt"),
    ("analyzing", "Analyse..."),
    ("found", "{n} vidéos trouvées"),
    ("downloading", "Téléchargement…"),
    ("stopping", "Arrêt..."),
    ("converting", "Conversion..."),
    ("btn_start", "Démarrer"),
    ("btn_stop", "Arrêter"),
    ("no_url", "Entrez une URL !"),
    ("select_one", "Sélectionnez au moins une vidéo !"),
    ("select_folder", "Choisissez un dossier de téléchargement !"),
    ("ffmpeg_missing", "FFmpeg introuvable."),
    ("ytdlp_missing", "yt-dlp introuvable."),
    ("install_hint", "Commande d’installation :\n{cmd}"),
    ("install_now", "Installer / télécharger"),
    ("later", "Plus tard"),
    ("done", "Téléchargement terminé."),
    ("dl_error", "Erreur de téléchargement :\n{msg}"),
    ("an_error", "Impossible d’analyser le lien :\n{msg}"),
    ("format_lbl", "Format :"),
    ("quality_lbl", "Qualité :"),
    ("audio_quality_lbl", "Qualité audio :"),
    ("playlist_lbl", "Playlist / Vidéos"),
    ("select_all", "Tout sélectionner"),
    ("check_btn", "Vérifier"),
    ("folder_btn", "Choisir dossier"),
    ("open_folder", "Ouvrir le dossier"),
    ("lang_lbl", "Langue :"),
    ("url_ph", "Collez un lien (YouTube, Instagram, TikTok, X, etc.)..."),
    ("search_ph", "Rechercher dans la liste..."),
    ("folder_lbl", "Dossier : {path}"),
];

const IT: &[(&str, &str)] = &[
    ("title_error", "Errore"),
    ("title_warn", "Avviso"),
    ("title_ok", "OK"),
    ("title_deps", "Requisiti"),
    ("ready", "Pronto"),
    ("analyzing", "Analisi..."),
    ("found", "Trovati {n} video"),
    ("downloading", "Download…"),
    ("stopping", "Interruzione..."),
    ("converting", "Conversione..."),
    ("btn_start", "Avvia download"),
    ("btn_stop", "Stop"),
    ("no_url", "Inserisci un URL!"),
    ("select_one", "Seleziona almeno un video!"),
    ("select_folder", "Seleziona una cartella di download!"),
    ("ffmpeg_missing", "FFmpeg non trovato."),
    ("ytdlp_missing", "yt-dlp non trovato."),
    ("install_hint", "Comando di installazione:\n{cmd}"),
    ("install_now", "Installa / scarica"),
    ("later", "Più tardi"),
    ("done", "Download completato."),
    ("dl_error", "Errore di download:\n{msg}"),
    ("an_error", "Impossibile analizzare il link:\n{msg}"),
    ("format_lbl", "Formato:"),
    ("quality_lbl", "Qualità:"),
    ("audio_quality_lbl", "Qualità audio:"),
    ("playlist_lbl", "Playlist / Video"),
    ("select_all", "Seleziona tutto"),
    ("check_btn", "Controlla"),
    ("folder_btn", "Scegli cartella"),
    ("open_folder", "Apri cartella"),
    ("lang_lbl", "Lingua:"),
    ("url_ph", "Incolla un link (YouTube, Instagram, TikTok, X, ecc.)..."),
    ("search_ph", "Cerca nella lista..."),
    ("folder_lbl", "Cartella: {path}"),
];

const JA: &[(&str, &str)] = &[
    ("title_error", "エラー"),
    ("title_warn", "警告"),
    ("title_ok", "OK"),
    ("title_deps", "要件"),
    ("ready", "準備完了"),
    ("analyzing", "解析中..."),
    ("found", "{n} 件の動画"),
    ("downloading", "ダウンロード中…"),
    ("stopping", "停止中..."),
    ("converting", "変換中..."),
    ("btn_start", "ダウンロード開始"),
    ("btn_stop", "停止"),
    ("no_url", "URLを入力して！"),
    ("select_one", "少なくとも1つ選んで！"),
    ("select_folder", "保存フォルダを選んで！"),
    ("ffmpeg_missing", "FFmpeg が見つかりません。"),
    ("ytdlp_missing", "yt-dlp が見つかりません。"),
    ("install_hint", "インストール:\n{cmd}"),
    ("install_now", "今すぐ導入"),
    ("later", "後で"),
    ("done", "完了しました。"),
    ("dl_error", "エラー:\n{msg}"),
    ("an_error", "リンクを解析できません:\n{msg}"),
    ("format_lbl", "形式:"),
    ("quality_lbl", "品質:"),
    ("audio_quality_lbl", "音質:"),
    ("playlist_lbl", "プレイリスト / 動画"),
    ("select_all", "すべて選択"),
    ("check_btn", "確認"),
    ("folder_btn", "フォルダ選択"),
    ("open_folder", "フォルダを開く"),
    ("lang_lbl", "言語:"),
    ("url_ph", "リンクを貼り付け（YouTube/Instagram/TikTok/Xなど）..."),
    ("search_ph", "リスト内検索..."),
    ("folder_lbl", "フォルダ: {path}"),
];

const ZH: &[(&str, &str)] = &[
    ("title_error", "错误"),
    ("title_warn", "警告"),
    ("title_ok", "好"),
    ("title_deps", "依赖"),
    ("ready", "就绪"),
    ("analyzing", "正在解析..."),
    ("found", "找到 {n} 个视频"),
    ("downloading", "下载中…"),
    ("stopping", "正在停止..."),
    ("converting", "转换中..."),
    ("btn_start", "开始下载"),
    ("btn_stop", "停止"),
    ("no_url", "请输入 URL！"),
    ("select_one", "请至少选择一个视频！"),
    ("select_folder", "请选择下载文件夹！"),
    ("ffmpeg_missing", "未找到 FFmpeg。"),
    ("ytdlp_missing", "未找到 yt-dlp。"),
    ("install_hint", "安装命令：\n{cmd}"),
    ("install_now", "立即安装/下载"),
    ("later", "稍后"),
    ("done", "下载完成。"),
    ("dl_error", "下载错误:\n{msg}"),
    ("an_error", "无法解析链接:\n{msg}"),
    ("format_lbl", "格式:"),
    ("quality_lbl", "清晰度:"),
    ("audio_quality_lbl", "音频质量:"),
    ("playlist_lbl", "播放列表 / 视频"),
    ("select_all", "全选"),
    ("check_btn", "检查"),
    ("folder_btn", "选择文件夹"),
    ("open_folder", "打开文件夹"),
    ("lang_lbl", "语言:"),
    ("url_ph", "粘贴链接（YouTube/Instagram/TikTok/X 等）..."),
    ("search_ph", "列表内搜索..."),
    ("folder_lbl", "文件夹: {path}"),
];

const RU: &[(&str, &str)] = &[
    ("title_error", "Ошибка"),
    ("title_warn", "Предупреждение"),
    ("title_ok", "ОК"),
    ("title_deps", "Требования"),
    ("ready", "Готово"),
    ("analyzing", "Анализ..."),
    ("found", "Найдено видео: {n}"),
    ("downloading", "Загрузка…"),
    ("stopping", "Остановка..."),
    ("converting", "Конвертация..."),
    ("btn_start", "Начать загрузку"),
    ("btn_stop", "Стоп"),
    ("no_url", "Введите URL!"),
    ("select_one", "Выберите хотя бы одно видео!"),
    ("select_folder", "Выберите папку для загрузки!"),
    ("ffmpeg_missing", "FFmpeg не найден."),
    ("ytdlp_missing", "yt-dlp не найден."),
    ("install_hint", "Команда установки:\n{cmd}"),
    ("install_now", "Установить/скачать"),
    ("later", "Позже"),
    ("done", "Загрузка завершена."),
    ("dl_error", "Ошибка загрузки:\n{msg}"),
    ("an_error", "Не удалось проанализировать ссылку:\n{msg}"),
    ("format_lbl", "Формат:"),
    ("quality_lbl", "Качество:"),
    ("audio_quality_lbl", "Качество аудио:"),
    ("playlist_lbl", "Плейлист / Видео"),
    ("select_all", "Выбрать все"),
    ("check_btn", "Проверить"),
    ("folder_btn", "Выбрать папку"),
    ("open_folder", "Открыть папку"),
    ("lang_lbl", "Язык:"),
    ("url_ph", "Вставьте ссылку (YouTube, Instagram, TikTok, X и т. д.)..."),
    ("search_ph", "Поиск по списку..."),
    ("folder_lbl", "Папка: {path}"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_lang() {
        assert_eq!(norm_lang("de_DE.UTF-8"), "de");
        assert_eq!(norm_lang("pt-BR"), "pt");
        assert_eq!(norm_lang("EN"), "en");
        assert_eq!(norm_lang(""), "en");
    }

    #[test]
    fn test_detect_lang_code() {
        assert_eq!(detect_lang_code(Some("ja_JP.UTF-8")), "ja");
        assert_eq!(detect_lang_code(Some("zh-Hans-CN")), "zh");
        assert_eq!(detect_lang_code(Some("pt_BR")), "en");
        assert_eq!(detect_lang_code(None), "en");
    }

    #[test]
    fn test_every_language_has_every_key() {
        for lang in LANGUAGES {
            let t = table(lang.code).unwrap();
            for (key, _) in TR {
                assert!(lookup(t, key).is_some(), "{} is missing {}", lang.code, key);
            }
            assert_eq!(t.len(), TR.len(), "{} has extra keys", lang.code);
        }
    }

    #[test]
    fn test_tr_with_placeholders() {
        assert_eq!(tr("en", "found", &[("n", "3")]), "Found 3 videos");
        assert_eq!(tr("tr", "found", &[("n", "3")]), "3 video bulundu");
        assert_eq!(
            tr("en", "folder_lbl", &[("path", "/tmp/x")]),
            "Folder: /tmp/x"
        );
    }

    #[test]
    fn test_tr_missing_placeholder_is_left_alone() {
        assert_eq!(tr("en", "found", &[]), "Found {n} videos");
    }

    #[test]
    fn test_tr_fallbacks() {
        // unknown language uses the base table
        assert_eq!(tr("pt", "ready", &[]), "Hazır");
        // locale-style codes are normalised first
        assert_eq!(tr("de_DE", "ready", &[]), raw("de", "ready"));
        // unknown keys come back verbatim
        assert_eq!(tr("en", "no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn test_translations_cover_all_keys() {
        let map = translations("fr");
        assert_eq!(map.len(), TR.len());
        assert_eq!(map["btn_stop"], "Arrêter");
    }
}
