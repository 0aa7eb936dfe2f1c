//! BDD harness (cucumber-rs).
//!
//! This crate keeps scenario tests isolated from the production crates. The
//! page sources the scenarios start from live here so step definitions stay
//! short.

/// Named starting pages used by the feature files.
pub fn page_source(name: &str) -> Option<&'static str> {
    let src = match name {
        "default-only" => {
            "import React from \"react\";\n\nexport default function Page() {\n  const [count, setCount] = useState(0);\n  return <p onClick={() => setCount(count + 1)}>{count}</p>;\n}\n"
        }
        "split-react" => {
            "import { useEffect } from \"react\";\nimport React from \"react\";\n\nexport default function Page() {\n  useEffect(() => {}, []);\n  return null;\n}\n"
        }
        "bare-hooks" => {
            "export default function Counter() {\n  const [n, setN] = useState(0);\n  useEffect(() => {}, [n]);\n  return <button onClick={() => setN(n + 1)}>{n}</button>;\n}\n"
        }
        "mentions-only" => {
            "// useState is only mentioned here.\nexport default function About() {\n  return <p>{\"useEffect\"}</p>;\n}\n"
        }
        "data-imports" => {
            "import x from \"@/data/x.json\";\nimport y from \"@/data/y.json\";\n\nexport default function Page() {\n  return [x, y];\n}\n"
        }
        "link-element" => {
            "export default function Nav() {\n  return <Link href=\"/\">Home</Link>;\n}\n"
        }
        _ => return None,
    };
    Some(src)
}
