//! 依赖标识符
//!
//! `Identifier<T>` 是注册表的键：按身份比较，名称只用于诊断。
//! 类型参数 `T` 只存在于编译期，用来约束 bind/resolve 两端的值类型。

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

/// 类型擦除后的标识符身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct IdentifierKey(Uuid);

/// 解析为 `T` 类型值的不透明注册表键
///
/// 同名创建的两个标识符仍是不同的键；克隆保持身份不变，
/// 克隆体指向同一个绑定。
pub struct Identifier<T> {
    key: IdentifierKey,
    name: Arc<str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Identifier<T> {
    /// 创建新的唯一标识符
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            key: IdentifierKey(Uuid::new_v4()),
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// 诊断用名称
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn key(&self) -> IdentifierKey {
        self.key
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

impl<T> Clone for Identifier<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            name: Arc::clone(&self.name),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Identifier<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Identifier<T> {}

impl<T> Hash for Identifier<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for Identifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for Identifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
