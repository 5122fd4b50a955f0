// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Reusable object pool
//!
//! Workers check out heavy objects (accumulators and their buffers) instead of
//! building new ones for every pulse sequence. The pool is an ordinary value
//! owned by whoever needs it, typically shared behind an `Arc`.
//!
//! Growth is unbounded: `acquire` never fails and never waits. The number of
//! objects alive is bounded by the number of concurrent workers upstream.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use log::debug;

type FactoryFn<T> = Box<dyn Fn() -> T + Send + Sync>;

struct PoolState<T> {
    idle: Vec<T>,
    in_use: usize,
    created: usize,
}

/// Pool of reusable `T` built on demand by a factory
pub struct ObjectPool<T> {
    state: Mutex<PoolState<T>>,
    factory: FactoryFn<T>,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool; objects are built by `factory` as needed
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                in_use: 0,
                created: 0,
            }),
            factory: Box::new(factory),
        }
    }

    /// Create a pool and pre-build `count` idle objects
    pub fn with_capacity<F>(count: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let pool = Self::new(factory);
        {
            let mut state = pool.lock();
            for _ in 0..count {
                let item = (pool.factory)();
                state.idle.push(item);
            }
            state.created = count;
        }
        pool
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Take an object, reusing the most recently released one if any
    pub fn acquire(&self) -> T {
        let mut state = self.lock();
        state.in_use += 1;
        if let Some(item) = state.idle.pop() {
            return item;
        }
        state.created += 1;
        let created = state.created;
        drop(state);

        debug!("Object pool grew to {} objects", created);
        (self.factory)()
    }

    /// Hand an object back for reuse
    pub fn release(&self, item: T) {
        let mut state = self.lock();
        state.in_use = state.in_use.saturating_sub(1);
        state.idle.push(item);
    }

    pub fn idle_count(&self) -> usize {
        self.lock().idle.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.lock().in_use
    }

    /// Total number of objects built by the factory
    pub fn created_count(&self) -> usize {
        self.lock().created
    }
}

impl<T> ObjectPool<T> {
    /// Check out an object that returns to the pool when dropped
    pub fn checkout(self: &Arc<Self>) -> PooledObject<T> {
        PooledObject {
            pool: Arc::clone(self),
            item: Some(self.acquire()),
        }
    }
}

/// Object on loan from an [`ObjectPool`], released on drop
pub struct PooledObject<T> {
    pool: Arc<ObjectPool<T>>,
    item: Option<T>,
}

impl<T> Deref for PooledObject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only taken in drop
        self.item.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for PooledObject<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for PooledObject<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
