//! 解析栈
//!
//! 每个线程记录正在求值的绑定（别名、动态工厂、未缓存的记忆化工厂）。
//! 同一绑定在求值期间再次进入即为循环；栈深度超过配置上限时直接报错，
//! 不会耗尽线程栈。父容器回退不入栈。

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use super::binding::BindingId;
use crate::config::ContainerConfig;
use crate::errors::{ContainerError, Result};

struct Frame {
    binding: BindingId,
    name: Arc<str>,
}

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// 析构时弹出对应的帧（包括 panic 展开时）
pub(crate) struct FrameGuard {
    // 帧属于当前线程的栈
    _not_send: PhantomData<*const ()>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let _ = RESOLUTION_STACK.try_with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn enter(
    binding: BindingId,
    name: &Arc<str>,
    config: &ContainerConfig,
) -> Result<FrameGuard> {
    RESOLUTION_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();

        if config.detect_cycles {
            if let Some(start) = stack.iter().position(|frame| frame.binding == binding) {
                let chain: Vec<String> = stack[start..]
                    .iter()
                    .map(|frame| frame.name.to_string())
                    .chain(std::iter::once(name.to_string()))
                    .collect();
                warn!(chain = %chain.join(" -> "), "Circular dependency detected");
                return Err(ContainerError::CircularDependency { chain });
            }
        }

        if stack.len() >= config.max_depth {
            warn!(
                identifier = %name,
                limit = config.max_depth,
                "Resolution depth limit exceeded"
            );
            return Err(ContainerError::DepthExceeded {
                name: name.to_string(),
                limit: config.max_depth,
            });
        }

        stack.push(Frame {
            binding,
            name: Arc::clone(name),
        });
        Ok(FrameGuard {
            _not_send: PhantomData,
        })
    })
}

#[cfg(test)]
pub(crate) fn depth() -> usize {
    RESOLUTION_STACK.with(|stack| stack.borrow().len())
}
