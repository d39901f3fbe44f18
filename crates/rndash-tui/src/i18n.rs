//! Locale tables for the dashboard chrome.
//!
//! The supervisor emits structured records and English narrative text; only
//! the UI chrome (labels, titles, modal prompts) is localized. Locale is
//! picked once at startup from the usual POSIX environment variables.

use std::env;

pub struct KeyLabels {
    pub start: &'static str,
    pub reload: &'static str,
    pub android: &'static str,
    pub ios: &'static str,
    pub stop: &'static str,
    pub install: &'static str,
    pub kill_orphans: &'static str,
    pub reset: &'static str,
    pub full_reset: &'static str,
    pub system_logs: &'static str,
    pub bundler_logs: &'static str,
    pub build_logs: &'static str,
    pub device_logs: &'static str,
    pub toggle_view: &'static str,
    pub quit: &'static str,
}

pub struct HeaderLabels {
    pub node: &'static str,
    pub path: &'static str,
    pub branch: &'static str,
    pub diff: &'static str,
    pub diff_clean: &'static str,
    pub pkg_mgr: &'static str,
    pub monorepo: &'static str,
}

pub struct StatusLabels {
    pub title: &'static str,
    pub metro: &'static str,
    pub android: &'static str,
    pub ios: &'static str,
    pub idle: &'static str,
    pub building: &'static str,
    pub running: &'static str,
    pub error: &'static str,
    pub detached: &'static str,
}

pub struct LogLabels {
    pub system: &'static str,
    pub bundler: &'static str,
    pub build: &'static str,
    pub device: &'static str,
    pub hidden: &'static str,
    pub empty: &'static str,
}

pub struct QuitModal {
    pub title: &'static str,
    pub message: &'static str,
    pub detach_label: &'static str,
    pub detach_desc: &'static str,
    pub quit_label: &'static str,
    pub quit_desc: &'static str,
}

pub struct ResetModal {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub confirm_desc: &'static str,
    pub cancel_label: &'static str,
    pub cancel_desc: &'static str,
    pub cancelled: &'static str,
}

pub struct Locale {
    pub keys: KeyLabels,
    pub header: HeaderLabels,
    pub status: StatusLabels,
    pub logs: LogLabels,
    pub quit_modal: QuitModal,
    pub reset_modal: ResetModal,
}

pub static EN: Locale = Locale {
    keys: KeyLabels {
        start: "Start metro",
        reload: "Reload",
        android: "Android",
        ios: "iOS",
        stop: "Stop all",
        install: "Install",
        kill_orphans: "Kill orphans",
        reset: "Fresh cache",
        full_reset: "Full reset",
        system_logs: "System",
        bundler_logs: "Metro",
        build_logs: "Builds",
        device_logs: "Device",
        toggle_view: "Layout",
        quit: "Quit",
    },
    header: HeaderLabels {
        node: "node",
        path: "path",
        branch: "branch",
        diff: "diff",
        diff_clean: "clean",
        pkg_mgr: "pkg mgr",
        monorepo: "monorepo",
    },
    status: StatusLabels {
        title: "PROCESSES",
        metro: "metro",
        android: "android",
        ios: "ios",
        idle: "idle",
        building: "building",
        running: "running",
        error: "error",
        detached: "detached",
    },
    logs: LogLabels {
        system: "system",
        bundler: "metro",
        build: "builds",
        device: "device",
        hidden: "hidden",
        empty: "no output yet",
    },
    quit_modal: QuitModal {
        title: "Quit rndash?",
        message: "Metro can keep running in the background.",
        detach_label: "[d]",
        detach_desc: " detach metro and quit   ",
        quit_label: "[q]",
        quit_desc: " stop everything and quit",
    },
    reset_modal: ResetModal {
        title: "FULL RESET",
        message: "Deletes node_modules and native build caches, then reinstalls.",
        confirm_label: "[y]",
        confirm_desc: " do it   ",
        cancel_label: "[n]",
        cancel_desc: " cancel",
        cancelled: "full reset cancelled",
    },
};

pub static ES: Locale = Locale {
    keys: KeyLabels {
        start: "Iniciar metro",
        reload: "Recargar",
        android: "Android",
        ios: "iOS",
        stop: "Parar todo",
        install: "Instalar",
        kill_orphans: "Matar huérfanos",
        reset: "Caché limpia",
        full_reset: "Reinicio total",
        system_logs: "Sistema",
        bundler_logs: "Metro",
        build_logs: "Builds",
        device_logs: "Dispositivo",
        toggle_view: "Vista",
        quit: "Salir",
    },
    header: HeaderLabels {
        node: "node",
        path: "ruta",
        branch: "rama",
        diff: "diff",
        diff_clean: "limpio",
        pkg_mgr: "gestor",
        monorepo: "monorepo",
    },
    status: StatusLabels {
        title: "PROCESOS",
        metro: "metro",
        android: "android",
        ios: "ios",
        idle: "inactivo",
        building: "compilando",
        running: "activo",
        error: "error",
        detached: "desacoplado",
    },
    logs: LogLabels {
        system: "sistema",
        bundler: "metro",
        build: "builds",
        device: "dispositivo",
        hidden: "oculto",
        empty: "sin salida todavía",
    },
    quit_modal: QuitModal {
        title: "¿Salir de rndash?",
        message: "Metro puede seguir corriendo en segundo plano.",
        detach_label: "[d]",
        detach_desc: " desacoplar metro y salir   ",
        quit_label: "[q]",
        quit_desc: " parar todo y salir",
    },
    reset_modal: ResetModal {
        title: "REINICIO TOTAL",
        message: "Borra node_modules y las cachés nativas, luego reinstala.",
        confirm_label: "[s]",
        confirm_desc: " adelante   ",
        cancel_label: "[n]",
        cancel_desc: " cancelar",
        cancelled: "reinicio total cancelado",
    },
};

/// Locale for a POSIX language tag like `es_ES.UTF-8`.
#[must_use]
pub fn for_tag(tag: &str) -> &'static Locale {
    let code = tag
        .split(['_', '.', '-'])
        .next()
        .unwrap_or("")
        .to_lowercase();
    match code.as_str() {
        "es" => &ES,
        _ => &EN,
    }
}

/// Pick the locale from `LANG`-family environment variables, English
/// fallback.
pub fn detect() -> &'static Locale {
    let tag = ["LANG", "LANGUAGE", "LC_ALL", "LC_MESSAGES"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default();
    for_tag(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rndash_core::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn detect_without_locale_vars_falls_back_to_english() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guards: Vec<EnvVarGuard> = ["LANG", "LANGUAGE", "LC_ALL", "LC_MESSAGES"]
            .iter()
            .map(|key| EnvVarGuard::remove(key))
            .collect();

        assert!(std::ptr::eq(detect(), &EN));
    }

    #[test]
    fn spanish_tags_select_spanish() {
        assert!(std::ptr::eq(for_tag("es_ES.UTF-8"), &ES));
        assert!(std::ptr::eq(for_tag("es"), &ES));
    }

    #[test]
    fn unknown_and_empty_tags_fall_back_to_english() {
        assert!(std::ptr::eq(for_tag("fr_FR"), &EN));
        assert!(std::ptr::eq(for_tag(""), &EN));
        assert!(std::ptr::eq(for_tag("C.UTF-8"), &EN));
    }
}
