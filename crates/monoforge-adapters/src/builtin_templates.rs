//! Built-in template sets and catalog discovery.
//!
//! Three sets ship compiled into the binary, one per built-in generator.
//! A templates directory on disk can override any of them by name; see
//! [`discover`] for the lookup order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use monoforge_core::{
    application::{ApplicationError, ports::TemplateCatalog},
    domain::{TemplateEntry, TemplateSet},
    error::ForgeResult,
};

use crate::template_loader::DirectoryCatalog;

/// Environment variable naming a templates directory.
pub const TEMPLATES_DIR_ENV: &str = "MONOFORGE_TEMPLATES_DIR";

// ── Built-in sets ─────────────────────────────────────────────────────────────

const COUNTER_APP: &[(&str, &str)] = &[
    (
        "app.tsx",
        r#"import Counter from './src/components/Counter';
import './src/components/Counter.css';

export function App() {
  return (
    <div style={{ padding: '20px' }}>
      <Counter title="<%= title %>" initialValue={0} />
    </div>
  );
}

export default App;
"#,
    ),
    (
        "src/components/Counter.tsx",
        r#"import { useState } from 'react';

interface CounterProps {
  title: string;
  initialValue?: number;
}

export function Counter({ title, initialValue = 0 }: CounterProps) {
  const [count, setCount] = useState(initialValue);

  const increment = () => setCount(count + 1);
  const decrement = () => setCount(count - 1);
  const reset = () => setCount(initialValue);

  return (
    <div className="counter">
      <h1 className="counter-title">
        {title}: {count}
      </h1>
      <div className="counter-buttons">
        <button onClick={increment} className="counter-button counter-button--increment">
          Increment
        </button>
        <button onClick={decrement} className="counter-button counter-button--decrement">
          Decrement
        </button>
      </div>
      <div className="counter-reset">
        <button onClick={reset} className="counter-button counter-button--reset">
          Reset
        </button>
      </div>
    </div>
  );
}

export default Counter;
"#,
    ),
    (
        "src/components/Counter.css",
        r#"/* <%= className %> counter */
.counter {
  max-width: 320px;
  margin: 0 auto;
  text-align: center;
  font-family: sans-serif;
}

.counter-buttons,
.counter-reset {
  display: flex;
  justify-content: center;
  gap: 8px;
  margin-top: 12px;
}

.counter-button {
  padding: 8px 16px;
  border: none;
  border-radius: 4px;
  cursor: pointer;
}

.counter-button--increment {
  background: #2ed573;
}

.counter-button--decrement {
  background: #ff4757;
}

.counter-button--reset {
  background: #ddd;
}
"#,
    ),
];

const TODO_APP: &[(&str, &str)] = &[
    (
        "app.tsx",
        r#"import TodoApp from './src/components/TodoApp';
import './src/components/TodoApp.css';

export function App() {
  return (
    <div style={{ padding: '20px', minHeight: '100vh', backgroundColor: '#f5f5f5' }}>
      <TodoApp
        title="<%= title %>"
        enableFilters={<%= enableFilters %>}
        enablePriority={<%= enablePriority %>}
      />
    </div>
  );
}

export default App;
"#,
    ),
    (
        "src/components/TodoApp.tsx",
        r#"import { useState } from 'react';

type Priority = 'low' | 'medium' | 'high';
type FilterType = 'all' | 'active' | 'completed';

interface Todo {
  id: number;
  text: string;
  completed: boolean;
  priority?: Priority;
}

interface TodoAppProps {
  title: string;
  enableFilters?: boolean;
  enablePriority?: boolean;
}

export function TodoApp({
  title,
  enableFilters = <%= enableFilters %>,
  enablePriority = <%= enablePriority %>,
}: TodoAppProps) {
  const [todos, setTodos] = useState<Todo[]>([]);
  const [inputValue, setInputValue] = useState('');
  const [filter, setFilter] = useState<FilterType>('all');
  const [nextId, setNextId] = useState(1);

  const addTodo = () => {
    const text = inputValue.trim();
    if (!text) return;
    setTodos([
      ...todos,
      { id: nextId, text, completed: false, ...(enablePriority && { priority: 'medium' as Priority }) },
    ]);
    setInputValue('');
    setNextId(nextId + 1);
  };

  const toggleTodo = (id: number) =>
    setTodos(todos.map((t) => (t.id === id ? { ...t, completed: !t.completed } : t)));

  const deleteTodo = (id: number) => setTodos(todos.filter((t) => t.id !== id));

  const updatePriority = (id: number, priority: Priority) =>
    setTodos(todos.map((t) => (t.id === id ? { ...t, priority } : t)));

  const visible = todos.filter((t) =>
    filter === 'active' ? !t.completed : filter === 'completed' ? t.completed : true
  );
  const active = todos.filter((t) => !t.completed).length;

  return (
    <div className="todo-app">
      <h1 className="todo-title">{title}</h1>

      <div className="todo-input-section">
        <input
          type="text"
          value={inputValue}
          onChange={(e) => setInputValue(e.target.value)}
          onKeyDown={(e) => e.key === 'Enter' && addTodo()}
          placeholder="Add a new task..."
          className="todo-input"
        />
        <button onClick={addTodo} className="todo-add-button">
          Add
        </button>
      </div>

      {enableFilters && (
        <div className="todo-filters">
          {(['all', 'active', 'completed'] as FilterType[]).map((f) => (
            <button
              key={f}
              onClick={() => setFilter(f)}
              className={`filter-button ${filter === f ? 'active' : ''}`}
            >
              {f}
            </button>
          ))}
        </div>
      )}

      <ul className="todo-list">
        {visible.map((todo) => (
          <li key={todo.id} className={`todo-item ${todo.completed ? 'completed' : ''}`}>
            <input type="checkbox" checked={todo.completed} onChange={() => toggleTodo(todo.id)} />
            <span className="todo-text">{todo.text}</span>
            {enablePriority && (
              <select
                value={todo.priority || 'medium'}
                onChange={(e) => updatePriority(todo.id, e.target.value as Priority)}
                className="todo-priority"
              >
                <option value="low">Low</option>
                <option value="medium">Medium</option>
                <option value="high">High</option>
              </select>
            )}
            <button onClick={() => deleteTodo(todo.id)} className="todo-delete-button">
              Delete
            </button>
          </li>
        ))}
      </ul>

      <div className="todo-stats">
        <span>Total: {todos.length}</span>
        <span>Active: {active}</span>
      </div>
    </div>
  );
}

export default TodoApp;
"#,
    ),
    (
        "src/components/TodoApp.css",
        r#".todo-app {
  max-width: 480px;
  margin: 0 auto;
  font-family: sans-serif;
}

.todo-input-section,
.todo-filters,
.todo-stats {
  display: flex;
  gap: 8px;
  margin: 12px 0;
}

.todo-input {
  flex: 1;
  padding: 8px;
}

.filter-button.active {
  font-weight: bold;
}

.todo-item.completed .todo-text {
  text-decoration: line-through;
  color: #888;
}
"#,
    ),
];

const UTILS_LIB: &[(&str, &str)] = &[
    (
        "README.md",
        r#"# <%= name %>

<%= description %>

## Building

Run `nx build <%= name %>` to build the library.

## Running unit tests

Run `nx test <%= name %>` to execute the unit tests via Vitest.
"#,
    ),
    (
        "src/index.ts",
        r#"/**
 * <%= description %>
 *
 * @packageDocumentation
 */

export * from './lib/<%= fileName %>.js';
"#,
    ),
    (
        "src/lib/__fileName__.ts__tmpl__",
        r#"/** Convert kebab-case, snake_case or spaced words to camelCase. */
export function toCamelCase(str: string): string {
  return str
    .replace(/[-_\s]+(.)?/g, (_, c: string | undefined) => (c ? c.toUpperCase() : ''))
    .replace(/^[A-Z]/, (c) => c.toLowerCase());
}

/** Convert camelCase, PascalCase, snake_case or spaced words to kebab-case. */
export function toKebabCase(str: string): string {
  return str
    .replace(/([a-z0-9])([A-Z])/g, '$1-$2')
    .replace(/[_\s]+/g, '-')
    .toLowerCase();
}

/** Resolve after `ms` milliseconds. */
export function delay(ms: number): Promise<void> {
  return new Promise((resolve) => setTimeout(resolve, ms));
}

/** True for null, undefined, empty strings, empty arrays and empty objects. */
export function isEmpty(value: unknown): boolean {
  if (value === null || value === undefined) return true;
  if (typeof value === 'string' || Array.isArray(value)) return value.length === 0;
  if (value instanceof Date) return false;
  if (typeof value === 'object') return Object.keys(value as object).length === 0;
  return false;
}

/** Recursively copy plain objects, arrays and dates. */
export function deepClone<T>(value: T): T {
  if (value === null || typeof value !== 'object') return value;
  if (value instanceof Date) return new Date(value.getTime()) as T;
  if (Array.isArray(value)) return value.map((item) => deepClone(item)) as T;
  const copy = {} as Record<string, unknown>;
  for (const [key, inner] of Object.entries(value as Record<string, unknown>)) {
    copy[key] = deepClone(inner);
  }
  return copy as T;
}
"#,
    ),
    (
        "src/lib/__fileName__.spec.ts__tmpl__",
        r#"import { toCamelCase, toKebabCase, delay, isEmpty, deepClone } from './<%= fileName %>.js';

describe('<%= className %> utils', () => {
  it('converts to camelCase', () => {
    expect(toCamelCase('hello-world')).toBe('helloWorld');
    expect(toCamelCase('hello_world')).toBe('helloWorld');
    expect(toCamelCase('hello world')).toBe('helloWorld');
  });

  it('converts to kebab-case', () => {
    expect(toKebabCase('helloWorld')).toBe('hello-world');
    expect(toKebabCase('HelloWorld')).toBe('hello-world');
    expect(toKebabCase('hello_world')).toBe('hello-world');
  });

  it('delays', async () => {
    const start = Date.now();
    await delay(20);
    expect(Date.now() - start).toBeGreaterThanOrEqual(15);
  });

  it('detects empty values', () => {
    expect(isEmpty(null)).toBe(true);
    expect(isEmpty('')).toBe(true);
    expect(isEmpty([])).toBe(true);
    expect(isEmpty({})).toBe(true);
    expect(isEmpty(0)).toBe(false);
    expect(isEmpty({ a: 1 })).toBe(false);
  });

  it('deep clones nested structures', () => {
    const original = { a: 1, b: { c: [1, 2] }, d: new Date('2023-01-01') };
    const cloned = deepClone(original);
    expect(cloned).toEqual(original);
    expect(cloned.b).not.toBe(original.b);
    expect(cloned.d).not.toBe(original.d);
  });
});
"#,
    ),
];

const BUILTIN_SETS: &[(&str, &[(&str, &str)])] = &[
    ("counter-app", COUNTER_APP),
    ("todo-app", TODO_APP),
    ("utils-lib", UTILS_LIB),
];

/// Catalog over the compiled-in sets.
#[derive(Debug, Clone, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateCatalog for BuiltinCatalog {
    fn template_set(&self, name: &str) -> ForgeResult<TemplateSet> {
        let (_, files) = BUILTIN_SETS
            .iter()
            .find(|(set, _)| *set == name)
            .ok_or_else(|| ApplicationError::TemplateSetNotFound { name: name.into() })?;

        let entries = files
            .iter()
            .map(|(path, content)| TemplateEntry::new(*path, *content))
            .collect();
        Ok(TemplateSet::new(name, entries))
    }

    fn available(&self) -> Vec<String> {
        BUILTIN_SETS.iter().map(|(name, _)| name.to_string()).collect()
    }
}

// ── Layering ──────────────────────────────────────────────────────────────────

/// On-disk sets shadow built-in sets of the same name.
#[derive(Debug)]
pub struct LayeredCatalog {
    overlay: Option<DirectoryCatalog>,
    builtin: BuiltinCatalog,
}

impl LayeredCatalog {
    pub fn builtin_only() -> Self {
        Self {
            overlay: None,
            builtin: BuiltinCatalog,
        }
    }

    pub fn with_overlay(overlay: DirectoryCatalog) -> Self {
        Self {
            overlay: Some(overlay),
            builtin: BuiltinCatalog,
        }
    }

    /// Directory the overlay was loaded from, if any.
    pub fn overlay_dir(&self) -> Option<&Path> {
        self.overlay.as_ref().map(DirectoryCatalog::root)
    }
}

impl TemplateCatalog for LayeredCatalog {
    fn template_set(&self, name: &str) -> ForgeResult<TemplateSet> {
        if let Some(overlay) = &self.overlay {
            if overlay.contains(name) {
                debug!(set = name, "using on-disk template set");
                return overlay.template_set(name);
            }
        }
        self.builtin.template_set(name)
    }

    fn available(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.builtin.available().into_iter().collect();
        if let Some(overlay) = &self.overlay {
            names.extend(overlay.available());
        }
        names.into_iter().collect()
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Build the catalog for a run.
///
/// The first existing directory wins:
///
/// 1. `explicit` (from `--templates` or configuration)
/// 2. `$MONOFORGE_TEMPLATES_DIR`
/// 3. `<workspace>/tools/templates`
///
/// An explicit directory that does not exist is an error; the implicit
/// candidates are skipped quietly. With no directory, only built-in sets
/// are served.
#[instrument(skip_all, fields(workspace = %workspace.display()))]
pub fn discover(workspace: &Path, explicit: Option<&Path>) -> ForgeResult<LayeredCatalog> {
    if let Some(dir) = explicit {
        let dir = absolutize(workspace, dir);
        if !dir.is_dir() {
            return Err(ApplicationError::TemplateSource {
                path: dir,
                reason: "directory not found".into(),
            }
            .into());
        }
        return load_overlay(&dir);
    }

    for candidate in candidate_dirs(workspace) {
        debug!(path = %candidate.display(), "checking templates directory");
        if candidate.is_dir() {
            return load_overlay(&candidate);
        }
    }

    debug!("no templates directory; using built-in sets");
    Ok(LayeredCatalog::builtin_only())
}

fn load_overlay(dir: &Path) -> ForgeResult<LayeredCatalog> {
    let overlay = DirectoryCatalog::load(dir)?;
    info!(path = %dir.display(), sets = overlay.len(), "Template overrides loaded");
    Ok(LayeredCatalog::with_overlay(overlay))
}

fn candidate_dirs(workspace: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Ok(env_dir) = std::env::var(TEMPLATES_DIR_ENV) {
        paths.push(absolutize(workspace, Path::new(&env_dir)));
    }
    paths.push(workspace.join("tools").join("templates"));
    paths
}

fn absolutize(workspace: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        workspace.join(dir)
    }
}
