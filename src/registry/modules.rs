//! Реестр загруженных модулей контента.
//!
//! Отвечает на один вопрос: какая версия пространства имён загружена сейчас.
//! Порядок перечисления фиксирован порядком загрузки — именно он определяет
//! индексы в таблице версий при записи.

use std::collections::HashMap;

use crate::header::Version;

/// Загруженный модуль: пространство имён плюс текущая версия.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub namespace: String,
    pub version: Version,
}

#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    host_namespace: String,
    host_version: Version,
    loaded: Vec<LoadedModule>,
    by_namespace: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Создаёт реестр с пространством имён приложения-хоста.
    pub fn new(host_namespace: impl Into<String>, host_version: Version) -> Self {
        Self {
            host_namespace: host_namespace.into(),
            host_version,
            loaded: Vec::new(),
            by_namespace: HashMap::new(),
        }
    }

    /// Регистрирует модуль. Повторная загрузка того же пространства имён
    /// обновляет версию, не меняя позицию в порядке перечисления.
    pub fn load(&mut self, namespace: impl Into<String>, version: Version) {
        let namespace = namespace.into();
        match self.by_namespace.get(&namespace) {
            Some(&i) => self.loaded[i].version = version,
            None => {
                self.by_namespace
                    .insert(namespace.clone(), self.loaded.len());
                self.loaded.push(LoadedModule { namespace, version });
            }
        }
    }

    pub fn host_namespace(&self) -> &str {
        &self.host_namespace
    }

    pub fn host_version(&self) -> Version {
        self.host_version
    }

    /// Текущая загруженная версия пространства имён; хост всегда «загружен».
    pub fn loaded_version(&self, namespace: &str) -> Option<Version> {
        if namespace == self.host_namespace {
            return Some(self.host_version);
        }
        self.by_namespace
            .get(namespace)
            .map(|&i| self.loaded[i].version)
    }

    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.loaded_version(namespace).is_some()
    }

    /// Модули в фиксированном порядке перечисления (без хоста).
    pub fn iter(&self) -> impl Iterator<Item = &LoadedModule> {
        self.loaded.iter()
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
